//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgassiError, Result};
use crate::protocol::{read_command, write_response, Command, Response};
use crate::service::DataService;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared data service
    service: Arc<DataService>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O over two handles of the same socket
    pub fn new(stream: TcpStream, service: Arc<DataService>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            service,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses.
    /// Returns when the client disconnects, goes idle past the read
    /// timeout, or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(AgassiError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected ({:?})", self.peer_addr, e.kind());
                    return Ok(());
                }
                Err(AgassiError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            let response = self.execute_command(command);

            if let Err(e) = self.send_response(response) {
                if let AgassiError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command and return a response
    fn execute_command(&self, command: Command) -> Response {
        let service = &self.service;

        let result = match command {
            Command::CreatePlayer { player } => service
                .create_player(player)
                .map(|id| Response::ok(Some(id.into_bytes()))),
            Command::CreateCoach { coach } => service
                .create_coach(coach)
                .map(|id| Response::ok(Some(id.into_bytes()))),
            Command::ListPlayers => service.list_players().and_then(|p| Response::json(&p)),
            Command::ListCoaches => service.list_coaches().and_then(|c| Response::json(&c)),
            Command::GetPlayer { id } => match service.get_player(&id) {
                Ok(Some(player)) => Response::json(&player),
                Ok(None) => Ok(Response::not_found(&format!("player {} not found", id))),
                Err(e) => Err(e),
            },
            Command::GetCoach { id } => match service.get_coach(&id) {
                Ok(Some(coach)) => Response::json(&coach),
                Ok(None) => Ok(Response::not_found(&format!("coach {} not found", id))),
                Err(e) => Err(e),
            },
            Command::AddReview { player_id, review } => service
                .add_review(&player_id, review)
                .map(|()| Response::ok(None)),
            Command::ListReviews { player_id } => service
                .list_reviews(&player_id)
                .and_then(|r| Response::json(&r)),
            Command::Ping => Ok(Response::ok(Some(b"PONG".to_vec()))),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!("Request from {} failed: {}", self.peer_addr, e);
            Response::from_error(&e)
        })
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}
