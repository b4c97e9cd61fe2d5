//! Shared test context for session engine tests.
#![allow(dead_code)] // shared across test binaries

pub mod fixtures;

use std::sync::Arc;

use study_core::types::StudyConfig;
use study_engine::{MemoryStore, SessionController};

/// Controller over a fresh in-memory store.
pub fn controller(store: Arc<MemoryStore>) -> SessionController {
    SessionController::new(store, StudyConfig::default())
}

/// Controller with a custom configuration.
pub fn controller_with_config(store: Arc<MemoryStore>, config: StudyConfig) -> SessionController {
    SessionController::new(store, config)
}
