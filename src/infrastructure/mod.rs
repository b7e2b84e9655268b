//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete storage backends selected at startup by `STORAGE_BACKEND`.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`memory`] - In-process store implementing every repository trait

pub mod memory;
pub mod persistence;

use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{ClickRepository, SplitRepository};
use memory::InMemoryStore;
use persistence::{PgClickRepository, PgSplitRepository};

/// Repository handles for one storage backend.
#[derive(Clone)]
pub struct Storage {
    pub splits: Arc<dyn SplitRepository>,
    pub clicks: Arc<dyn ClickRepository>,
}

impl Storage {
    /// Both repositories backed by one shared [`InMemoryStore`].
    pub fn memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            splits: store.clone(),
            clicks: store,
        }
    }

    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            splits: Arc::new(PgSplitRepository::new(pool.clone())),
            clicks: Arc::new(PgClickRepository::new(pool)),
        }
    }
}
