//! Blocking client
//!
//! One request at a time over a single TCP connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{AgassiError, Result};
use crate::model::{Coach, Player, Review};
use crate::protocol::{read_response, write_command, Command, Response, Status};
use crate::store::Bucket;

/// Client for an Agassi server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| AgassiError::Network(format!("can't connect: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Bound how long a single response may take
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send one command and wait for its response
    pub fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(&Command::Ping)?;
        expect_ok(response, Bucket::Players, "").map(|_| ())
    }

    pub fn create_player(&mut self, player: &Player) -> Result<String> {
        let command = Command::CreatePlayer {
            player: player.clone(),
        };
        let response = self.call(&command)?;
        expect_ok(response, Bucket::Players, &player.id).and_then(|r| into_id(&r))
    }

    pub fn create_coach(&mut self, coach: &Coach) -> Result<String> {
        let command = Command::CreateCoach {
            coach: coach.clone(),
        };
        let response = self.call(&command)?;
        expect_ok(response, Bucket::Coaches, &coach.id).and_then(|r| into_id(&r))
    }

    pub fn list_players(&mut self) -> Result<Vec<Player>> {
        let response = self.call(&Command::ListPlayers)?;
        expect_ok(response, Bucket::Players, "").and_then(|r| from_body(&r))
    }

    pub fn list_coaches(&mut self) -> Result<Vec<Coach>> {
        let response = self.call(&Command::ListCoaches)?;
        expect_ok(response, Bucket::Coaches, "").and_then(|r| from_body(&r))
    }

    pub fn get_player(&mut self, id: &str) -> Result<Option<Player>> {
        let response = self.call(&Command::GetPlayer { id: id.to_string() })?;
        optional(response, Bucket::Players, id)
    }

    pub fn get_coach(&mut self, id: &str) -> Result<Option<Coach>> {
        let response = self.call(&Command::GetCoach { id: id.to_string() })?;
        optional(response, Bucket::Coaches, id)
    }

    pub fn add_review(&mut self, player_id: &str, review: &Review) -> Result<()> {
        let command = Command::AddReview {
            player_id: player_id.to_string(),
            review: review.clone(),
        };
        let response = self.call(&command)?;
        expect_ok(response, Bucket::Players, player_id).map(|_| ())
    }

    pub fn list_reviews(&mut self, player_id: &str) -> Result<Vec<Review>> {
        let command = Command::ListReviews {
            player_id: player_id.to_string(),
        };
        let response = self.call(&command)?;
        expect_ok(response, Bucket::Players, player_id).and_then(|r| from_body(&r))
    }
}

/// Turn a non-OK status back into the matching error
fn expect_ok(response: Response, bucket: Bucket, key: &str) -> Result<Response> {
    match response.status {
        Status::Ok => Ok(response),
        Status::NotFound => Err(AgassiError::NotFound {
            bucket: bucket.name(),
            key: key.to_string(),
        }),
        Status::Conflict => Err(AgassiError::DuplicateKey {
            bucket: bucket.name(),
            key: key.to_string(),
        }),
        Status::Error => Err(AgassiError::Network(format!(
            "server error: {}",
            response.message()
        ))),
    }
}

fn optional<T: DeserializeOwned>(response: Response, bucket: Bucket, key: &str) -> Result<Option<T>> {
    if response.status == Status::NotFound {
        return Ok(None);
    }
    expect_ok(response, bucket, key).and_then(|r| from_body(&r)).map(Some)
}

fn into_id(response: &Response) -> Result<String> {
    let body = response.payload.as_deref().unwrap_or_default();
    String::from_utf8(body.to_vec())
        .map_err(|_| AgassiError::Protocol("record id is not valid UTF-8".to_string()))
}

fn from_body<T: DeserializeOwned>(response: &Response) -> Result<T> {
    let body = response.payload.as_deref().unwrap_or_default();
    serde_json::from_slice(body)
        .map_err(|e| AgassiError::Protocol(format!("invalid response body: {}", e)))
}
