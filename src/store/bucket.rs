//! Bucket layout
//!
//! A store file holds exactly these top-level buckets. Each maps a record id
//! to its encoded bytes; there are no cross-bucket keys and no secondary
//! indexes.

use std::fmt;

use redb::TableDefinition;

/// Table type shared by every bucket: record id → encoded record
pub type BucketTable = TableDefinition<'static, &'static str, &'static [u8]>;

const PLAYERS: BucketTable = TableDefinition::new("players");
const COACHES: BucketTable = TableDefinition::new("coaches");

/// Top-level namespaces of a store file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Players,
    Coaches,
}

impl Bucket {
    /// Every bucket provisioned when a store is opened
    pub const ALL: [Bucket; 2] = [Bucket::Players, Bucket::Coaches];

    /// On-disk table name
    pub fn name(self) -> &'static str {
        match self {
            Bucket::Players => "players",
            Bucket::Coaches => "coaches",
        }
    }

    pub(crate) fn definition(self) -> BucketTable {
        match self {
            Bucket::Players => PLAYERS,
            Bucket::Coaches => COACHES,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
