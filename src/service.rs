//! Data Service
//!
//! The façade request handlers talk to. It forwards every call to whichever
//! [`StoreEngine`] it was built with and owns that engine's lifetime.

use std::fs;

use crate::config::{Config, StoreType};
use crate::error::{AgassiError, Result};
use crate::model::{Coach, Player, Review};
use crate::store::{RedbStore, StoreEngine};

/// Pass-through access to the configured storage engine
pub struct DataService {
    engine: Box<dyn StoreEngine>,
}

impl DataService {
    pub fn new(engine: Box<dyn StoreEngine>) -> Self {
        Self { engine }
    }

    /// Build the engine described by `config` and wrap it
    pub fn open(config: &Config) -> Result<Self> {
        make_data_store(config).map(Self::new)
    }

    pub fn create_player(&self, player: Player) -> Result<String> {
        self.engine.create_player(player)
    }

    pub fn create_coach(&self, coach: Coach) -> Result<String> {
        self.engine.create_coach(coach)
    }

    pub fn list_players(&self) -> Result<Vec<Player>> {
        self.engine.list_players()
    }

    pub fn list_coaches(&self) -> Result<Vec<Coach>> {
        self.engine.list_coaches()
    }

    pub fn get_player(&self, id: &str) -> Result<Option<Player>> {
        self.engine.get_player(id)
    }

    pub fn get_coach(&self, id: &str) -> Result<Option<Coach>> {
        self.engine.get_coach(id)
    }

    pub fn add_review(&self, player_id: &str, review: Review) -> Result<()> {
        self.engine.add_review(player_id, review)
    }

    pub fn list_reviews(&self, player_id: &str) -> Result<Vec<Review>> {
        self.engine.list_reviews(player_id)
    }

    pub fn close(&self) -> Result<()> {
        self.engine.close()
    }
}

/// Create the storage engine for the configured site
///
/// Makes sure the data directory exists, then opens `{data_dir}/{site}.db`.
pub fn make_data_store(config: &Config) -> Result<Box<dyn StoreEngine>> {
    tracing::info!("Making data store, type={}", config.store_type);

    match config.store_type {
        StoreType::Redb => {
            fs::create_dir_all(&config.data_dir).map_err(|e| {
                AgassiError::Config(format!(
                    "can't make directory {}: {}",
                    config.data_dir.display(),
                    e
                ))
            })?;
            let store = RedbStore::open(config.db_path(), config.open_timeout)?;
            Ok(Box::new(store))
        }
    }
}
