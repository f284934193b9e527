use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::{HttpFetcher, StaticScraper};
use crate::generator::AiCopyWriter;
use crate::normalizer::Normalizer;
use crate::pipeline::Pipeline;
use crate::scraper::{ChromeRenderer, LoginWindow};
use crate::store::{FileSessionStore, SessionStore};

pub struct AppContext {
    pub config: Config,
    pub normalizer: Normalizer,
    pub session_store: Arc<dyn SessionStore>,
    pub pipeline: Pipeline,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let session_store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::from_config(&config.session)?);
        Self::with_store(config, session_store)
    }

    pub fn with_store(config: Config, session_store: Arc<dyn SessionStore>) -> Result<Self> {
        let normalizer = Normalizer::new(config.link.clone());
        let fetcher = Arc::new(HttpFetcher::new(&config.fetcher)?);
        let static_scraper = StaticScraper::new(fetcher, config.link.clone());
        let renderer = Arc::new(ChromeRenderer::new(
            config.scraper.clone(),
            config.link.clone(),
            session_store.clone(),
        ));
        let writer = Arc::new(AiCopyWriter::new(config.generator.clone())?);

        let pipeline = Pipeline::new(normalizer.clone(), static_scraper, renderer, writer);

        Ok(Self {
            config,
            normalizer,
            session_store,
            pipeline,
        })
    }

    /// A visible browser sharing this context's session store.
    pub fn login_window(&self) -> LoginWindow {
        LoginWindow::new(self.config.scraper.clone(), self.session_store.clone())
    }
}
