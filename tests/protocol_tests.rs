//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::Cursor;

use agassi::model::{Coach, Player, Review, Score, Skills};
use agassi::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, Response, Status, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
use agassi::AgassiError;

fn sample_review() -> Review {
    Review {
        author: Some(Coach::new("c1", "Bo")),
        skills: Some(Skills {
            total: Some(Score::new(8.5, "sharp")),
            forehand: None,
            backhand: None,
        }),
    }
}

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_every_command() {
    let commands = vec![
        Command::CreatePlayer {
            player: Player::new("p1", "Ana"),
        },
        Command::CreateCoach {
            coach: Coach::new("c1", "Bo"),
        },
        Command::ListPlayers,
        Command::ListCoaches,
        Command::GetPlayer { id: "p1".to_string() },
        Command::GetCoach { id: "c1".to_string() },
        Command::AddReview {
            player_id: "p1".to_string(),
            review: sample_review(),
        },
        Command::ListReviews {
            player_id: "p1".to_string(),
        },
        Command::Ping,
    ];

    for cmd in commands {
        let encoded = encode_command(&cmd).unwrap();
        assert_eq!(encoded[0], cmd.command_type() as u8);
        assert_eq!(decode_command(&encoded).unwrap(), cmd);
    }
}

#[test]
fn test_create_player_payload_is_json() {
    let cmd = Command::CreatePlayer {
        player: Player::new("p1", "Ana"),
    };
    let encoded = encode_command(&cmd).unwrap();

    let body = br#"{"name":"Ana","id":"p1"}"#;
    assert_eq!(encoded[0], 0x01);
    assert_eq!(&encoded[1..5], &(body.len() as u32).to_be_bytes());
    assert_eq!(&encoded[HEADER_SIZE..], body);
}

#[test]
fn test_empty_key_allowed() {
    let cmd = Command::GetPlayer { id: String::new() };
    let encoded = encode_command(&cmd).unwrap();
    assert_eq!(decode_command(&encoded).unwrap(), cmd);
}

#[test]
fn test_decode_unknown_command() {
    let bytes = [0xFF, 0, 0, 0, 0];
    assert!(matches!(
        decode_command(&bytes),
        Err(AgassiError::Protocol(_))
    ));
}

#[test]
fn test_decode_incomplete_header() {
    assert!(matches!(
        decode_command(&[0x03, 0, 0]),
        Err(AgassiError::Protocol(_))
    ));
}

#[test]
fn test_decode_incomplete_payload() {
    let mut encoded = encode_command(&Command::GetCoach { id: "c1".to_string() }).unwrap();
    encoded.pop();
    assert!(matches!(
        decode_command(&encoded),
        Err(AgassiError::Protocol(_))
    ));
}

#[test]
fn test_decode_payload_too_large() {
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());
    assert!(matches!(
        decode_command(&bytes),
        Err(AgassiError::Protocol(_))
    ));
}

#[test]
fn test_decode_invalid_json_body() {
    let body = b"{\"name\":";
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);

    match decode_command(&bytes) {
        Err(AgassiError::Protocol(msg)) => assert!(msg.contains("CREATE_PLAYER")),
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_decode_key_length_overrun() {
    // key_len says 10 but only 2 bytes follow
    let payload = [0, 0, 0, 10, b'p', b'1'];
    let mut bytes = vec![0x05];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(matches!(
        decode_command(&bytes),
        Err(AgassiError::Protocol(_))
    ));
}

#[test]
fn test_decode_non_utf8_key() {
    let payload = [0, 0, 0, 2, 0xFF, 0xFE];
    let mut bytes = vec![0x08];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(matches!(
        decode_command(&bytes),
        Err(AgassiError::Protocol(_))
    ));
}

#[test]
fn test_ping_with_payload_rejected() {
    let bytes = [0x09, 0, 0, 0, 1, b'x'];
    assert!(matches!(
        decode_command(&bytes),
        Err(AgassiError::Protocol(_))
    ));
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_responses() {
    let responses = vec![
        Response::ok(Some(b"p1".to_vec())),
        Response::ok(None),
        Response::not_found("player p9 not found"),
        Response::conflict("key p1 already in bucket players"),
        Response::error("boom"),
    ];

    for response in responses {
        let encoded = encode_response(&response);
        assert_eq!(decode_response(&encoded).unwrap(), response);
    }
}

#[test]
fn test_response_from_error_status() {
    let duplicate = AgassiError::DuplicateKey {
        bucket: "players",
        key: "p1".to_string(),
    };
    let missing = AgassiError::NotFound {
        bucket: "players",
        key: "p9".to_string(),
    };

    assert_eq!(Response::from_error(&duplicate).status, Status::Conflict);
    assert_eq!(Response::from_error(&missing).status, Status::NotFound);
    assert_eq!(Response::from_error(&AgassiError::Closed).status, Status::Error);
    assert_eq!(Response::from_error(&AgassiError::Closed).message(), "store is closed");
}

#[test]
fn test_response_json() {
    let response = Response::json(&vec![Coach::new("c1", "Bo")]).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.message(), r#"[{"name":"Bo","id":"c1"}]"#);
}

#[test]
fn test_decode_unknown_status() {
    assert!(matches!(
        decode_response(&[0x7F, 0, 0, 0, 0]),
        Err(AgassiError::Protocol(_))
    ));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_command_sequence() {
    let mut buffer = Vec::new();
    write_command(&mut buffer, &Command::Ping).unwrap();
    write_command(&mut buffer, &Command::ListPlayers).unwrap();
    write_command(
        &mut buffer,
        &Command::CreateCoach {
            coach: Coach::new("c1", "Bo"),
        },
    )
    .unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(read_command(&mut cursor).unwrap(), Command::Ping);
    assert_eq!(read_command(&mut cursor).unwrap(), Command::ListPlayers);
    assert_eq!(
        read_command(&mut cursor).unwrap(),
        Command::CreateCoach {
            coach: Coach::new("c1", "Bo")
        }
    );

    // Stream exhausted
    match read_command(&mut cursor) {
        Err(AgassiError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF, got {:?}", other),
    }
}

#[test]
fn test_stream_response() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::conflict("taken")).unwrap();

    let response = read_response(&mut Cursor::new(buffer)).unwrap();
    assert_eq!(response.status, Status::Conflict);
    assert_eq!(response.message(), "taken");
}

#[test]
fn test_stream_truncated_payload() {
    let mut encoded = encode_command(&Command::CreatePlayer {
        player: Player::new("p1", "Ana"),
    })
    .unwrap();
    encoded.truncate(encoded.len() - 3);

    assert!(matches!(
        read_command(&mut Cursor::new(encoded)),
        Err(AgassiError::Io(_))
    ));
}
