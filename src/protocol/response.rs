//! Response definitions
//!
//! Represents responses to clients.

use serde::Serialize;

use crate::error::{AgassiError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Conflict = 0x02,
    Error = 0x03,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (id, JSON body, or error message)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an OK response carrying `value` as JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value).map_err(|e| AgassiError::Encode {
            kind: "response",
            reason: e.to_string(),
        })?;
        Ok(Self::ok(Some(body)))
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: &str) -> Self {
        Self {
            status: Status::NotFound,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create a CONFLICT response
    pub fn conflict(message: &str) -> Self {
        Self {
            status: Status::Conflict,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Map an engine failure to the status a client sees
    pub fn from_error(err: &AgassiError) -> Self {
        let message = err.to_string();
        match err {
            AgassiError::DuplicateKey { .. } => Self::conflict(&message),
            AgassiError::NotFound { .. } => Self::not_found(&message),
            _ => Self::error(&message),
        }
    }

    /// Payload as text, empty when absent
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }
}
