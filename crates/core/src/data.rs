//! The data service the wizard and the summary read moves from.
//!
//! The production service is a REST API keyed by move identifier. This
//! crate only depends on the `MoveDataService` trait; `InMemoryMoveService`
//! backs local runs and tests, optionally seeded from a JSON fixture file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::moves::{MoveId, MoveRecord, OrdersId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DataServiceError {
    #[error("move `{0}` was not found")]
    MoveNotFound(MoveId),
    #[error("data service unavailable: {0}")]
    Unavailable(String),
    #[error("could not load move fixtures: {0}")]
    Fixture(String),
}

#[async_trait]
pub trait MoveDataService: Send + Sync {
    async fn fetch_move(&self, move_id: &MoveId) -> Result<MoveRecord, DataServiceError>;

    /// Creates a draft move for the given orders.
    async fn create_move(&self, orders_id: &OrdersId) -> Result<MoveRecord, DataServiceError>;

    async fn health_check(&self) -> Result<(), DataServiceError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMoveService {
    moves: Arc<Mutex<BTreeMap<MoveId, MoveRecord>>>,
}

impl InMemoryMoveService {
    pub fn with_records(records: impl IntoIterator<Item = MoveRecord>) -> Self {
        let moves = records.into_iter().map(|record| (record.id.clone(), record)).collect();
        Self { moves: Arc::new(Mutex::new(moves)) }
    }

    /// Reads a JSON array of move records.
    pub fn from_fixture_file(path: &Path) -> Result<Self, DataServiceError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            DataServiceError::Fixture(format!("could not read `{}`: {error}", path.display()))
        })?;
        let records: Vec<MoveRecord> = serde_json::from_str(&raw).map_err(|error| {
            DataServiceError::Fixture(format!("could not parse `{}`: {error}", path.display()))
        })?;
        Ok(Self::with_records(records))
    }

    /// Every stored move, ordered by id.
    pub fn records(&self) -> Vec<MoveRecord> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<MoveId, MoveRecord>> {
        match self.moves.lock() {
            Ok(moves) => moves,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MoveDataService for InMemoryMoveService {
    async fn fetch_move(&self, move_id: &MoveId) -> Result<MoveRecord, DataServiceError> {
        self.lock()
            .get(move_id)
            .cloned()
            .ok_or_else(|| DataServiceError::MoveNotFound(move_id.clone()))
    }

    async fn create_move(&self, orders_id: &OrdersId) -> Result<MoveRecord, DataServiceError> {
        let id = Uuid::new_v4();
        let locator: String = id.simple().to_string().chars().take(6).collect();
        let record =
            MoveRecord::draft(MoveId(id.to_string()), orders_id.clone(), locator.to_uppercase());
        self.lock().insert(record.id.clone(), record.clone());
        Ok(record)
    }
}
