use serde::Serialize;
use std::num::Wrapping;
use system::{ClientMessage, ConnectionId, DrawingAction, ServerMessage, SessionLog};
use thiserror::Error;

/// One outbound message for one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

#[derive(Debug, Error, PartialEq)]
pub enum RelayError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
    #[error("all connection ids are in use")]
    ConnectionLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub connections: usize,
    pub log_length: usize,
}

/// Ordering authority for the shared canvas.
///
/// Owns the session log and the set of broadcast targets. Every operation
/// returns the deliveries it produces instead of performing I/O.
pub struct Relay {
    connection_id_source: Wrapping<ConnectionId>,
    connections: Vec<ConnectionId>,
    log: SessionLog,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connections: Vec::new(),
            log: SessionLog::new(),
        }
    }

    /// Registers a new broadcast target and produces its bulk replay.
    pub fn connect(&mut self) -> Result<(ConnectionId, Delivery), RelayError> {
        let connection_id = self.new_connection_id()?;
        self.connections.push(connection_id);
        log::info!(
            "Connection {} joined ({} connected, {} actions to replay)",
            connection_id,
            self.connections.len(),
            self.log.len()
        );
        let replay = Delivery {
            to: connection_id,
            message: ServerMessage::LoadDrawing(self.log.replay()),
        };
        Ok((connection_id, replay))
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c != connection_id);
        let removed = self.connections.len() != before;
        if removed {
            log::info!("Connection {} left", connection_id);
        }
        removed
    }

    pub fn receive(
        &mut self,
        from: &ConnectionId,
        message: ClientMessage,
    ) -> Result<Vec<Delivery>, RelayError> {
        match message {
            ClientMessage::Drawing(action) => self.on_action(from, action),
            ClientMessage::ClearCanvas => self.on_clear(from),
        }
    }

    /// Appends to the log and fans out to everyone but the sender.
    pub fn on_action(
        &mut self,
        from: &ConnectionId,
        action: DrawingAction,
    ) -> Result<Vec<Delivery>, RelayError> {
        if action.is_clear() {
            return self.on_clear(from);
        }
        self.ensure_connected(from)?;
        let deliveries = self.broadcast(ServerMessage::Drawing(action.clone()), Some(from));
        self.log.record(action);
        Ok(deliveries)
    }

    /// Empties the log. The sender clears its own canvas, so it is skipped.
    pub fn on_clear(&mut self, from: &ConnectionId) -> Result<Vec<Delivery>, RelayError> {
        self.ensure_connected(from)?;
        log::info!("Connection {} cleared the canvas", from);
        self.log.clear();
        Ok(self.broadcast(ServerMessage::ClearCanvas, Some(from)))
    }

    /// Administrative clear; every connection is told.
    pub fn reset(&mut self) -> Vec<Delivery> {
        log::info!("Canvas reset by admin");
        self.log.clear();
        self.broadcast(ServerMessage::ClearCanvas, None)
    }

    pub fn status(&self) -> RelayStatus {
        RelayStatus {
            connections: self.connections.len(),
            log_length: self.log.len(),
        }
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn connection_ids(&self) -> &[ConnectionId] {
        &self.connections
    }

    fn broadcast(&self, message: ServerMessage, without: Option<&ConnectionId>) -> Vec<Delivery> {
        self.connections
            .iter()
            .filter(|c| without.map_or(true, |w| w != *c))
            .map(|c| Delivery {
                to: *c,
                message: message.clone(),
            })
            .collect()
    }

    fn ensure_connected(&self, connection_id: &ConnectionId) -> Result<(), RelayError> {
        if self.connections.contains(connection_id) {
            Ok(())
        } else {
            Err(RelayError::UnknownConnection(*connection_id))
        }
    }

    fn new_connection_id(&mut self) -> Result<ConnectionId, RelayError> {
        if self.connections.len() > usize::from(ConnectionId::MAX) {
            return Err(RelayError::ConnectionLimit);
        }
        // skip ids still held by long-lived connections after wrap-around
        loop {
            self.connection_id_source += Wrapping(1);
            let candidate = self.connection_id_source.0;
            if !self.connections.contains(&candidate) {
                break Ok(candidate);
            }
        }
    }
}

impl std::default::Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
