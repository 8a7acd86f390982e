use crate::config::Config;
use crate::definition::service::DefinitionService;
use crate::search::corpus::Corpus;
use anyhow::Context;
use std::sync::Arc;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub definitions: Arc<DefinitionService>,
}

impl AppState {
    pub fn new(corpus: Arc<Corpus>, definitions: Arc<DefinitionService>) -> Self {
        Self {
            corpus,
            definitions,
        }
    }

    pub async fn init(config: &Config) -> anyhow::Result<Self> {
        let corpus = Corpus::load(&config.data_path).await.with_context(|| {
            format!("failed to load corpus from {}", config.data_path.display())
        })?;
        let definitions = DefinitionService::init(&config.definitions).await?;

        Ok(Self::new(Arc::new(corpus), definitions))
    }

    pub fn close(&self) {
        self.definitions.close();
    }
}
