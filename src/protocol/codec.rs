//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - CREATE_PLAYER / CREATE_COACH: JSON record
//! - GET_PLAYER / GET_COACH / LIST_REVIEWS: key_len (4 bytes) + key
//! - ADD_REVIEW: key_len (4 bytes) + player id + JSON review
//! - LIST_PLAYERS / LIST_COACHES / PING: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Command, Response, Status};
use crate::error::{AgassiError, Result};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let cmd_type = command.command_type() as u8;

    // Build payload based on command type
    let payload = match command {
        Command::CreatePlayer { player } => to_json(player)?,
        Command::CreateCoach { coach } => to_json(coach)?,
        Command::GetPlayer { id } | Command::GetCoach { id } => key_payload(id),
        Command::ListReviews { player_id } => key_payload(player_id),
        Command::AddReview { player_id, review } => {
            let mut payload = key_payload(player_id);
            payload.extend_from_slice(&to_json(review)?);
            payload
        }
        Command::ListPlayers | Command::ListCoaches | Command::Ping => Vec::new(),
    };

    Ok(frame(cmd_type, &payload))
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    // Parse command based on type
    match cmd_type {
        0x01 => Ok(Command::CreatePlayer {
            player: from_json("CREATE_PLAYER", payload)?,
        }),
        0x02 => Ok(Command::CreateCoach {
            coach: from_json("CREATE_COACH", payload)?,
        }),
        0x03 => expect_empty("LIST_PLAYERS", payload).map(|_| Command::ListPlayers),
        0x04 => expect_empty("LIST_COACHES", payload).map(|_| Command::ListCoaches),
        0x05 => {
            let (id, _) = take_key("GET_PLAYER", payload)?;
            Ok(Command::GetPlayer { id })
        }
        0x06 => {
            let (id, _) = take_key("GET_COACH", payload)?;
            Ok(Command::GetCoach { id })
        }
        0x07 => {
            let (player_id, rest) = take_key("ADD_REVIEW", payload)?;
            Ok(Command::AddReview {
                player_id,
                review: from_json("ADD_REVIEW", rest)?,
            })
        }
        0x08 => {
            let (player_id, _) = take_key("LIST_REVIEWS", payload)?;
            Ok(Command::ListReviews { player_id })
        }
        0x09 => expect_empty("PING", payload).map(|_| Command::Ping),
        _ => Err(AgassiError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// key_len (4) + key
fn key_payload(key: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + key.len());
    payload.extend_from_slice(&(key.len() as u32).to_be_bytes());
    payload.extend_from_slice(key.as_bytes());
    payload
}

/// Split a length-prefixed UTF-8 key off the front of a payload
fn take_key<'a>(name: &str, payload: &'a [u8]) -> Result<(String, &'a [u8])> {
    if payload.len() < 4 {
        return Err(AgassiError::Protocol(format!(
            "{} command: missing key length",
            name
        )));
    }

    let key_len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;

    if payload.len() - 4 < key_len {
        return Err(AgassiError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            name,
            key_len,
            payload.len() - 4
        )));
    }

    let key = std::str::from_utf8(&payload[4..4 + key_len]).map_err(|_| {
        AgassiError::Protocol(format!("{} command: key is not valid UTF-8", name))
    })?;

    Ok((key.to_string(), &payload[4 + key_len..]))
}

fn expect_empty(name: &str, payload: &[u8]) -> Result<()> {
    if !payload.is_empty() {
        return Err(AgassiError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| AgassiError::Protocol(format!("can't encode body: {}", e)))
}

fn from_json<T: DeserializeOwned>(name: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| AgassiError::Protocol(format!("{} command: invalid body: {}", name, e)))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    // Parse status
    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Conflict,
        0x03 => Status::Error,
        _ => {
            return Err(AgassiError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    // Extract payload
    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(kind);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

/// Validate the header and return (type byte, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(AgassiError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = payload_len(&bytes[..HEADER_SIZE], what)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(AgassiError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

/// Parse and bound-check the length field of a header
fn payload_len(header: &[u8], what: &str) -> Result<usize> {
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(AgassiError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one frame (header + payload) from a stream
///
/// Blocks until a complete frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = payload_len(&header, what)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
