use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use system::ConnectionId;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

/// The receiving side of a connection is gone; it should be deregistered.
#[derive(Debug, Error, PartialEq)]
#[error("connection {0} is closed")]
pub struct ConnectionClosed(pub ConnectionId);

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    /// Fire and forget. A slow connection loses the message, a closed one
    /// is reported back.
    pub fn send(&self, to: &ConnectionId, event: ConnectionEvent) -> Result<(), ConnectionClosed> {
        if let Some(tx) = self.connection_txs.get(to) {
            match tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!("Connection {} is not keeping up, message dropped", to)
                }
                Err(TrySendError::Closed(_)) => return Err(ConnectionClosed(*to)),
            }
        } else {
            log::warn!("No channel for connection {}", to);
        }
        Ok(())
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connection_txs.len()
    }
}
