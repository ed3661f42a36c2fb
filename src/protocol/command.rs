//! Command definitions
//!
//! Represents commands from clients.

use crate::model::{Coach, Player, Review};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    CreatePlayer = 0x01,
    CreateCoach = 0x02,
    ListPlayers = 0x03,
    ListCoaches = 0x04,
    GetPlayer = 0x05,
    GetCoach = 0x06,
    AddReview = 0x07,
    ListReviews = 0x08,
    Ping = 0x09,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Store a new player
    CreatePlayer { player: Player },

    /// Store a new coach
    CreateCoach { coach: Coach },

    ListPlayers,

    ListCoaches,

    /// Look up one player by id
    GetPlayer { id: String },

    /// Look up one coach by id
    GetCoach { id: String },

    /// Append a review to a player
    AddReview { player_id: String, review: Review },

    ListReviews { player_id: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreatePlayer { .. } => CommandType::CreatePlayer,
            Command::CreateCoach { .. } => CommandType::CreateCoach,
            Command::ListPlayers => CommandType::ListPlayers,
            Command::ListCoaches => CommandType::ListCoaches,
            Command::GetPlayer { .. } => CommandType::GetPlayer,
            Command::GetCoach { .. } => CommandType::GetCoach,
            Command::AddReview { .. } => CommandType::AddReview,
            Command::ListReviews { .. } => CommandType::ListReviews,
            Command::Ping => CommandType::Ping,
        }
    }
}
