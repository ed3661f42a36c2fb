//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Framed JSON)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: CREATE_PLAYER - Payload: JSON player
//! - 0x02: CREATE_COACH  - Payload: JSON coach
//! - 0x03: LIST_PLAYERS  - Payload: empty
//! - 0x04: LIST_COACHES  - Payload: empty
//! - 0x05: GET_PLAYER    - Payload: key
//! - 0x06: GET_COACH     - Payload: key
//! - 0x07: ADD_REVIEW    - Payload: key + JSON review
//! - 0x08: LIST_REVIEWS  - Payload: key
//! - 0x09: PING          - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK        (id, JSON body, or PONG)
//! - 0x01: NOT_FOUND
//! - 0x02: CONFLICT  (id already taken)
//! - 0x03: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
