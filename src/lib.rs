//! # Agassi
//!
//! Player and coach registry backed by an embedded, transactional,
//! single-file store:
//! - One store file per site, two buckets (`players`, `coaches`)
//! - Primary-key uniqueness enforced inside a write transaction
//! - Snapshot reads for listing
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Data Service                               │
//! │              (façade, owns the engine)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ dyn StoreEngine
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    RedbStore                                 │
//! │      (create/list/get, uniqueness, bucket provisioning)      │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │  Record Codec   │            │      redb       │
//!   │     (JSON)      │            │ (bucket store)  │
//!   └─────────────────┘            └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod store;
pub mod service;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AgassiError, Result};
pub use config::{Config, StoreType};
pub use model::{Coach, Player, Review, Score, Skills};
pub use service::DataService;
pub use store::{RedbStore, StoreEngine};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Agassi
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
