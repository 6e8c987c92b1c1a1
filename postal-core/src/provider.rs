use crate::{
    Config, LookupError, LookupOutcome, PostalCode, provider::onemap::OneMapProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod onemap;

/// Resolves one postal code to at most one address.
#[async_trait]
pub trait GeocodeProvider: Send + Sync + Debug {
    async fn search(&self, postal: PostalCode) -> Result<LookupOutcome, LookupError>;
}

/// Construct the provider for the configured endpoint.
pub fn provider_from_config(config: &Config) -> Box<dyn GeocodeProvider> {
    tracing::debug!(endpoint = config.endpoint(), "provider ready");
    Box::new(OneMapProvider::new(config.endpoint().to_owned()))
}
