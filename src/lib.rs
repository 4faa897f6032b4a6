pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{EngineError, StoreError};
pub use models::*;

use anyhow::Result;
use services::analytics::{interaction_log_from_config, InteractionLog};
use services::community::CommunityDataAccess;
use services::feedback::FeedbackService;
use services::recommendation::RecommendationService;
use services::store::{InMemoryStore, OutfitStore, StoreSeed};
use std::sync::Arc;
use utils::{Clock, SystemClock};

const FEEDBACK_PRECISION_K: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<InMemoryStore>,
    pub community: Arc<CommunityDataAccess>,
    pub recommendation_service: Arc<RecommendationService>,
    pub feedback_service: Arc<FeedbackService>,
    pub interaction_log: Arc<dyn InteractionLog>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let store = match &config.store.seed_path {
            Some(path) => Arc::new(InMemoryStore::from_seed(StoreSeed::from_file(path)?).await),
            None => Arc::new(InMemoryStore::new()),
        };
        let dyn_store: Arc<dyn OutfitStore> = store.clone();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let interaction_log = interaction_log_from_config(&config.redis)?;

        let community = Arc::new(CommunityDataAccess::new(
            dyn_store.clone(),
            clock.clone(),
            config.community.clone(),
        ));

        let recommendation_service = Arc::new(RecommendationService::new(
            dyn_store.clone(),
            community.clone(),
            interaction_log.clone(),
            clock.clone(),
            config.recommendation.clone(),
        ));

        let feedback_service = Arc::new(FeedbackService::new(dyn_store, clock, FEEDBACK_PRECISION_K));

        Ok(Self {
            config,
            store,
            community,
            recommendation_service,
            feedback_service,
            interaction_log,
        })
    }
}

pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
