use async_trait::async_trait;

use crate::{error::LookupError, models::LookupOutcome, network::NetworkClient};

/// Resolves a product code to its attributes.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn search_code(&self, code: &str) -> Result<LookupOutcome, LookupError>;
}

#[async_trait]
impl ProductLookup for NetworkClient {
    async fn search_code(&self, code: &str) -> Result<LookupOutcome, LookupError> {
        NetworkClient::search_code(self, code).await
    }
}
