//! Process-wide messaging client with lazy, retryable initialization.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::provider::MessagingProvider;
use crate::error::AppResult;

/// Builds the messaging provider on first use
///
/// Construction is synchronous: it reads credentials and parses keys but
/// performs no network I/O.
pub trait ProviderFactory: Send + Sync {
    fn build(&self) -> AppResult<Arc<dyn MessagingProvider>>;
}

impl<F> ProviderFactory for F
where
    F: Fn() -> AppResult<Arc<dyn MessagingProvider>> + Send + Sync,
{
    fn build(&self) -> AppResult<Arc<dyn MessagingProvider>> {
        self()
    }
}

/// Lazily constructed handle to the messaging provider
///
/// The provider is built at most once per successful initialization. A
/// failed build leaves the client empty, so the next call tries again.
/// Cloning is cheap and clones share the same provider.
#[derive(Clone)]
pub struct MessagingClient {
    inner: Arc<Inner>,
}

struct Inner {
    provider: OnceCell<Arc<dyn MessagingProvider>>,
    factory: Arc<dyn ProviderFactory>,
}

impl MessagingClient {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider: OnceCell::new(),
                factory,
            }),
        }
    }

    /// A client that is already initialized with `provider`
    pub fn with_provider(provider: Arc<dyn MessagingProvider>) -> Self {
        let factory = {
            let provider = provider.clone();
            move || -> AppResult<Arc<dyn MessagingProvider>> { Ok(provider.clone()) }
        };

        Self {
            inner: Arc::new(Inner {
                provider: OnceCell::new_with(Some(provider)),
                factory: Arc::new(factory),
            }),
        }
    }

    /// Get the provider, building it if this is the first successful use
    pub async fn provider(&self) -> AppResult<Arc<dyn MessagingProvider>> {
        let provider = self
            .inner
            .provider
            .get_or_try_init(|| async {
                let provider = self.inner.factory.build()?;
                tracing::info!(provider = provider.name(), "Messaging client initialized");
                Ok::<_, crate::error::AppError>(provider)
            })
            .await?;

        Ok(provider.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.provider.initialized()
    }

    /// Name of the provider, once built
    pub fn provider_name(&self) -> Option<&'static str> {
        self.inner.provider.get().map(|provider| provider.name())
    }
}

impl fmt::Debug for MessagingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagingClient")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
