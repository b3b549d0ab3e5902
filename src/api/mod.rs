//! API module for HTTP handlers, middleware, and DTOs.
//!
//! The dispatch endpoint answers every path not claimed by the health
//! routes, so the router only names the operational surface explicitly.

pub mod cors;
pub mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
