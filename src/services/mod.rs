//! Business logic services

pub mod audit;
pub mod availability;
pub mod circulation;
pub mod policy;
pub mod rules;
pub mod sweeper;

use std::sync::Arc;

use crate::{config::CirculationConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub circulation: circulation::CirculationService,
    pub availability: availability::AvailabilityService,
    pub sweeper: sweeper::OverdueSweeper,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        config: CirculationConfig,
        audit: Arc<dyn audit::AuditSink>,
    ) -> Self {
        let sweeper = sweeper::OverdueSweeper::new(repository.clone(), config.sweep_chunk_size);
        Self {
            circulation: circulation::CirculationService::new(
                repository.clone(),
                config,
                audit,
                sweeper.clone(),
            ),
            availability: availability::AvailabilityService::new(repository.clone()),
            sweeper,
            repository,
        }
    }
}
