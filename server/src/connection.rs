use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::error::ErrorServiceUnavailable;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use tokio::sync::mpsc;

use system::{ClientMessage, ConnectionId, Frame, ServerMessage, WireFormat};

use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    Message {
        from: ConnectionId,
        message: ClientMessage,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    Message(ServerMessage),
}

/// Per-socket settings shared by every connection actor.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub buffer: usize,
}

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    codec: WireFormat,
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ServerMessage);

type ServerLink = mpsc::UnboundedSender<ConnectionCommand>;

/// Forwards one connection's commands to the server task in order, waiting
/// for room in the server inbox instead of dropping.
fn spawn_server_link(connection_id: ConnectionId, srv_tx: ServerTx) -> ServerLink {
    let (tx, mut rx) = mpsc::unbounded_channel::<ConnectionCommand>();

    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            if srv_tx.send(ServerCommand::from(command)).await.is_err() {
                log::warn!("Server task unavailable, link {} closed", connection_id);
                break;
            }
        }
    });

    tx
}

/// Registers with the server task and waits for the assigned id.
async fn register(
    srv_tx: &ServerTx,
    buffer: usize,
) -> Result<(ConnectionId, mpsc::Receiver<ConnectionEvent>), Error> {
    let (tx, mut rx) = mpsc::channel::<ConnectionEvent>(buffer);
    srv_tx
        .send(ConnectionCommand::Connect { tx }.into())
        .await
        .map_err(|_| ErrorServiceUnavailable("server task is not running"))?;
    match rx.recv().await {
        Some(ConnectionEvent::Connected { connection_id }) => Ok((connection_id, rx)),
        _ => Err(ErrorServiceUnavailable("connection refused")),
    }
}

struct ConnectionActor {
    connection_id: ConnectionId,
    srv_link: ServerLink,
    events: Option<mpsc::Receiver<ConnectionEvent>>,
    format: WireFormat,
}

impl ConnectionActor {
    fn to_server(&self, command: ConnectionCommand) {
        if self.srv_link.send(command).is_err() {
            log::warn!("Server link of {} is gone, command dropped", self.connection_id);
        }
    }

    fn ingress(&self, frame: Frame) {
        let from = self.connection_id;
        match WireFormat::decode_any::<ClientMessage>(&frame) {
            Ok(message) => {
                log::debug!("Ingress {} {:?}", from, message);
                self.to_server(ConnectionCommand::Message { from, message });
            }
            Err(e) => log::warn!("Ignoring undecodable frame from {}: {}", from, e),
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let mut rx = match self.events.take() {
            Some(rx) => rx,
            None => return,
        };
        let addr: Addr<ConnectionActor> = ctx.address();

        tokio::spawn(async move {
            log::debug!("connection forwarder - started");
            while let Some(event) = rx.recv().await {
                if !addr.connected() {
                    break;
                }
                match event {
                    ConnectionEvent::Message(message) => {
                        addr.do_send(ConnectionActorMessage(message))
                    }
                    ConnectionEvent::Connected { connection_id } => {
                        log::warn!("Unexpected re-registration as {}", connection_id)
                    }
                }
            }
            log::debug!("connection forwarder - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.to_server(ConnectionCommand::Disconnect {
            from: self.connection_id,
        });

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => self.ingress(Frame::Text(text.to_string())),
            Ok(ws::Message::Binary(bin)) => {
                log::trace!("Ingress size: {}", bin.len());
                self.ingress(Frame::Binary(bin.to_vec()))
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                log::warn!("WebSocket protocol error: {}", e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        let message = msg.0;
        match self.format.encode(&message) {
            Ok(Frame::Text(text)) => ctx.text(text),
            Ok(Frame::Binary(bytes)) => ctx.binary(bytes),
            Err(e) => log::error!("Cannot encode {:?}: {}", message, e),
        }
    }
}

/// The connection is registered before the upgrade completes, so every
/// frame the client sends already has a sender id.
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<ConnectQuery>,
    srv_tx: web::Data<ServerTx>,
    settings: web::Data<ConnectionSettings>,
) -> Result<HttpResponse, Error> {
    let _ = ws::handshake(&req)?;

    let (connection_id, events) = register(&srv_tx, settings.buffer).await?;
    log::debug!("Registered as connection {}", connection_id);

    let srv_link = spawn_server_link(connection_id, srv_tx.get_ref().clone());
    let actor = ConnectionActor {
        connection_id,
        srv_link: srv_link.clone(),
        events: Some(events),
        format: query.into_inner().codec,
    };
    ws::start(actor, &req, stream).map_err(|e| {
        let _ = srv_link.send(ConnectionCommand::Disconnect {
            from: connection_id,
        });
        e
    })
}
