use system::ConnectionId;
use tokio::sync::mpsc::{channel, Sender};

use crate::admin::AdminCommand;
use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::server_state::{Delivery, Relay};

pub type ServerTx = Sender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    Admin(AdminCommand),
}

impl From<ConnectionCommand> for ServerCommand {
    fn from(command: ConnectionCommand) -> Self {
        ServerCommand::Connection(command)
    }
}

impl From<AdminCommand> for ServerCommand {
    fn from(command: AdminCommand) -> Self {
        ServerCommand::Admin(command)
    }
}

/// Sole owner of the relay. Commands are handled one at a time, so log
/// mutation and broadcast never interleave.
struct Server {
    relay: Relay,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            relay: Relay::new(),
            connections: ConnectionTxStorage::new(),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => match self.relay.connect() {
                Ok((connection_id, replay)) => {
                    self.connections.insert(connection_id, tx);
                    log::debug!("{} connection channels open", self.connections.len());
                    let connected = ConnectionEvent::Connected { connection_id };
                    match self.connections.send(&connection_id, connected) {
                        Ok(()) => self.deliver(vec![replay]),
                        Err(e) => {
                            log::debug!("{}", e);
                            self.disconnect(&connection_id);
                        }
                    }
                }
                // dropping `tx` tells the connection it was refused
                Err(e) => log::warn!("Refusing connection: {}", e),
            },
            ConnectionCommand::Disconnect { from } => self.disconnect(&from),
            ConnectionCommand::Message { from, message } => {
                match self.relay.receive(&from, message) {
                    Ok(deliveries) => self.deliver(deliveries),
                    Err(e) => log::warn!("Dropping message: {}", e),
                }
            }
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::GetStatus { tx } => {
                let _ = tx.send(self.relay.status());
            }
            AdminCommand::Reset { tx } => {
                let deliveries = self.relay.reset();
                self.deliver(deliveries);
                let _ = tx.send(self.relay.status());
            }
        }
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.relay.disconnect(connection_id);
        self.connections.remove(connection_id);
    }

    fn deliver(&mut self, deliveries: Vec<Delivery>) {
        let mut closed = Vec::new();
        for Delivery { to, message } in deliveries {
            if let Err(e) = self.connections.send(&to, ConnectionEvent::Message(message)) {
                log::debug!("{}", e);
                closed.push(to);
            }
        }
        for connection_id in closed {
            self.disconnect(&connection_id);
        }
    }
}

pub fn spawn_server(buffer: usize) -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(buffer);

    tokio::spawn(async move {
        let mut server = Server::new();

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
        log::info!("Server task terminated");
    });

    srv_tx
}
