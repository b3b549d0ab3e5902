//! Clients for upstream services

pub mod client;
