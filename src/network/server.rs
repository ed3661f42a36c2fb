//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io::{BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::Connection;
use crate::config::Config;
use crate::error::{AgassiError, Result};
use crate::protocol::{write_response, Response};
use crate::service::DataService;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Stopped,
}

/// TCP server for Agassi
///
/// `run` and `shutdown` may be called from different threads; the state
/// transition between them is serialized by `state`.
pub struct Server {
    config: Config,
    service: Arc<DataService>,
    state: Mutex<State>,
    shutdown: AtomicBool,
    active_connections: Arc<AtomicUsize>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Server {
    /// Create a new server with the given config and data service
    pub fn new(config: Config, service: DataService) -> Self {
        Self {
            config,
            service: Arc::new(service),
            state: Mutex::new(State::Idle),
            shutdown: AtomicBool::new(false),
            active_connections: Arc::new(AtomicUsize::new(0)),
            local_addr: Mutex::new(None),
        }
    }

    /// Start the server (blocking)
    ///
    /// Returns once `shutdown` is called. The data service is closed on the
    /// way out; a close failure is logged, not returned.
    pub fn run(&self) -> Result<()> {
        let listener = {
            let mut state = self.state.lock();
            match *state {
                State::Idle => {}
                State::Running => {
                    return Err(AgassiError::Network("server already running".to_string()))
                }
                State::Stopped => {
                    return Err(AgassiError::Network("server already stopped".to_string()))
                }
            }

            let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
                AgassiError::Network(format!("can't listen on {}: {}", self.config.listen_addr, e))
            })?;
            listener.set_nonblocking(true)?;
            *self.local_addr.lock() = Some(listener.local_addr()?);
            *state = State::Running;
            listener
        };

        tracing::info!("Listening on {}", self.config.listen_addr);
        let result = self.accept_loop(&listener);
        drop(listener);

        *self.state.lock() = State::Stopped;
        tracing::info!("Server stopped accepting connections");

        if let Err(e) = self.service.close() {
            tracing::warn!("Failed to close data store: {}", e);
        }

        result
    }

    fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        while !self.shutdown.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }
        Ok(())
    }

    /// Spawn a handler thread for a new client, or turn it away at capacity
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        // Accepted sockets inherit non-blocking mode on some platforms.
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping {}: {}", peer, e);
            return;
        }

        let active = self.active_connections.fetch_add(1, Ordering::AcqRel);
        if active >= self.config.max_connections {
            self.active_connections.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!("Rejecting {}: {} connections open", peer, active);
            let mut writer = BufWriter::new(stream);
            let _ = write_response(&mut writer, &Response::error("too many connections"));
            return;
        }

        let service = Arc::clone(&self.service);
        let slot = ConnectionSlot(Arc::clone(&self.active_connections));
        let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                let _slot = slot;
                let result = Connection::new(stream, service).and_then(|mut conn| {
                    conn.set_timeouts(read_ms, write_ms)?;
                    conn.handle()
                });
                if let Err(e) = result {
                    tracing::debug!("Connection {} ended with error: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::warn!("Can't spawn handler for {}: {}", peer, e);
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        let state = self.state.lock();
        tracing::warn!("Shutdown requested (state {:?})", *state);
        self.shutdown.store(true, Ordering::Release);
    }

    /// Address actually bound, once `run` has started listening
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Number of client connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }
}

/// Releases a connection slot when the handler thread exits
struct ConnectionSlot(Arc<AtomicUsize>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
