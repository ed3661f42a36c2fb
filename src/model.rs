//! Data Model
//!
//! Entities persisted by the store. Players and coaches are top-level
//! records keyed by `id`; scores, skills and reviews only ever live inside
//! a player record.

use serde::{Deserialize, Serialize};

/// A single graded value with a free-text remark
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub score: f32,
    pub comment: String,
}

impl Score {
    pub fn new(score: f32, comment: impl Into<String>) -> Self {
        Self {
            score,
            comment: comment.into(),
        }
    }
}

/// Per-stroke breakdown of a review
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Score>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forehand: Option<Score>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backhand: Option<Score>,
}

/// A coach's assessment of a player
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Coach>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Skills>,
}

/// A player record, stored in the `players` bucket
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    pub name: String,

    /// Primary key; left empty to have the store assign one
    #[serde(default)]
    pub id: String,

    /// Reviews in the order they were added
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<Score>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            ..Default::default()
        }
    }
}

/// A coach record, stored in the `coaches` bucket
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coach {
    pub name: String,

    /// Primary key; left empty to have the store assign one
    #[serde(default)]
    pub id: String,
}

impl Coach {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}
