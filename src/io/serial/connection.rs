// src/io/serial/connection.rs
//
// Connection state machine for the controller link.
//
//   Disconnected --connect(port) ok--> Connected(link, port)
//   Connected    --disconnect()------> Disconnected
//   Connected    --on_io_failure(e)--> Disconnected   (no-op when already Disconnected)
//
// The link is always closed before the state is recorded as Disconnected.
// There is no intermediate "connecting" state and no automatic reconnect.

use std::fmt;
use std::io;

use crate::error::LinkError;

use super::link::{LinkOpener, SerialLink};

/// Current state of the controller link.
pub enum ConnectionState {
    Disconnected,
    Connected {
        port: String,
        link: Box<dyn SerialLink>,
    },
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected { port, .. } => {
                f.debug_tuple("Connected").field(port).finish()
            }
        }
    }
}

/// Owns the single link handle and enforces the connection transitions.
pub struct Connection {
    opener: Box<dyn LinkOpener>,
    state: ConnectionState,
}

impl Connection {
    pub fn new(opener: Box<dyn LinkOpener>) -> Self {
        Self {
            opener,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    /// Port identifier of the open link, if any.
    pub fn port(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Connected { port, .. } => Some(port),
            ConnectionState::Disconnected => None,
        }
    }

    /// Open the link. Only valid from Disconnected.
    pub fn connect(&mut self, port: &str) -> Result<(), LinkError> {
        if let ConnectionState::Connected { port: current, .. } = &self.state {
            return Err(LinkError::AlreadyConnected(current.clone()));
        }

        match self.opener.open(port) {
            Ok(link) => {
                tlog!("[serial] Opened {}", port);
                self.state = ConnectionState::Connected {
                    port: port.to_string(),
                    link,
                };
                Ok(())
            }
            Err(source) => {
                tlog!("[serial] Failed to open {}: {}", port, source);
                Err(LinkError::Connect {
                    port: port.to_string(),
                    source,
                })
            }
        }
    }

    /// Close the link if one is open. Close failures are logged, never returned.
    /// Returns whether a link was closed.
    pub fn disconnect(&mut self) -> bool {
        match self.close_link() {
            Some(port) => {
                tlog!("[serial] Closed {}", port);
                true
            }
            None => false,
        }
    }

    /// Force the link down after a read or write error.
    /// Returns `LinkLost` the first time; a repeat call while Disconnected is a no-op.
    pub fn on_io_failure(&mut self, error: io::Error) -> Option<LinkError> {
        let port = self.close_link()?;
        tlog!("[serial] Link to {} lost: {}", port, error);
        Some(LinkError::LinkLost(error))
    }

    /// The open link, for the poller's reads and writes.
    pub fn link_mut(&mut self) -> Option<&mut (dyn SerialLink + 'static)> {
        match &mut self.state {
            ConnectionState::Connected { link, .. } => Some(link.as_mut()),
            ConnectionState::Disconnected => None,
        }
    }

    fn close_link(&mut self) -> Option<String> {
        if let ConnectionState::Connected { port, link } = &mut self.state {
            if let Err(e) = link.close() {
                tlog!("[serial] Error closing {}: {}", port, e);
            }
        } else {
            return None;
        }

        match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Connected { port, .. } => Some(port),
            ConnectionState::Disconnected => None,
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close_link();
    }
}
