//! Store Module
//!
//! Persistence for players and coaches.
//!
//! ## Responsibilities
//! - Own the backing store file for one site
//! - Provision the fixed bucket set on open
//! - Enforce primary-key uniqueness per bucket
//! - Encode/decode records at the storage boundary
//!
//! ## Layout
//! ```text
//! {site}.db
//! ├── players   id → JSON Player (reviews embedded)
//! └── coaches   id → JSON Coach
//! ```
//!
//! Callers depend on [`StoreEngine`] only; [`RedbStore`] is the one
//! concrete engine today.

mod bucket;
pub mod codec;
pub mod ids;
mod redb_store;

pub use bucket::Bucket;
pub use codec::Record;
pub use redb_store::RedbStore;

use crate::error::Result;
use crate::model::{Coach, Player, Review};

/// Capabilities every storage engine provides
///
/// Every call is a single transaction and is synchronous from the caller's
/// point of view. Once [`close`](StoreEngine::close) has returned, every
/// further call fails with [`AgassiError::Closed`](crate::AgassiError::Closed).
pub trait StoreEngine: Send + Sync {
    /// Store a new player, returning the id it was stored under.
    /// An empty `id` is replaced with a generated one.
    fn create_player(&self, player: Player) -> Result<String>;

    /// Store a new coach, returning the id it was stored under.
    fn create_coach(&self, coach: Coach) -> Result<String>;

    /// All players in key order
    fn list_players(&self) -> Result<Vec<Player>>;

    /// All coaches in key order
    fn list_coaches(&self) -> Result<Vec<Coach>>;

    fn get_player(&self, id: &str) -> Result<Option<Player>>;

    fn get_coach(&self, id: &str) -> Result<Option<Coach>>;

    /// Append a review to an existing player's record
    fn add_review(&self, player_id: &str, review: Review) -> Result<()>;

    /// Reviews of one player, oldest first
    fn list_reviews(&self, player_id: &str) -> Result<Vec<Review>>;

    /// Release the backing store
    fn close(&self) -> Result<()>;
}
