use super::provider::ProviderError;
use super::store::StoreError;

/// Errors surfaced by the definition pipeline.
///
/// The type is `Clone` so that callers coalesced onto one in-flight
/// generation all receive the same outcome.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DefinitionError {
    #[error("{0}")]
    Validation(String),
    #[error("definition generation failed: {0}")]
    Upstream(String),
    #[error("definition store unavailable: {0}")]
    Persistence(String),
}

impl From<ProviderError> for DefinitionError {
    fn from(e: ProviderError) -> Self {
        DefinitionError::Upstream(e.to_string())
    }
}

impl From<StoreError> for DefinitionError {
    fn from(e: StoreError) -> Self {
        DefinitionError::Persistence(e.to_string())
    }
}
