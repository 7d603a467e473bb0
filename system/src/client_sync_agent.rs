use crate::codec::{CodecError, Frame, WireFormat};
use crate::message::{ClientMessage, DrawingAction, ServerMessage};
use crate::throttle::{Publish, Throttle, DEFAULT_THROTTLE_INTERVAL_MS};
use crate::traits::Canvas;
use crate::types::Timestamp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("cannot decode server frame: {0}")]
    Decode(#[from] CodecError),
}

/// Client side of the relay protocol.
///
/// Local actions are drawn at once and published through a [`Throttle`].
/// Remote actions are drawn in arrival order with their own parameters. The
/// agent never reads a clock; every time-dependent call takes `now`.
pub struct ClientSyncAgent<C> {
    canvas: C,
    throttle: Throttle<DrawingAction>,
}

impl<C: Canvas> ClientSyncAgent<C> {
    pub fn new(canvas: C) -> Self {
        Self::with_interval(canvas, DEFAULT_THROTTLE_INTERVAL_MS)
    }

    pub fn with_interval(canvas: C, interval: u64) -> Self {
        Self {
            canvas,
            throttle: Throttle::new(interval),
        }
    }

    /// Draws a locally produced action and offers it for publishing.
    ///
    /// A deferred result means the host has to call [`Self::fire_timer`] at
    /// `fire_at`.
    pub fn capture_local_action(
        &mut self,
        action: DrawingAction,
        now: Timestamp,
    ) -> Publish<ClientMessage> {
        if action.is_clear() {
            return Publish::Now(self.request_clear());
        }
        self.canvas.draw(&action);
        self.throttle.offer(action, now).map(ClientMessage::Drawing)
    }

    pub fn fire_timer(&mut self, now: Timestamp) -> Option<ClientMessage> {
        self.throttle.fire(now).map(ClientMessage::Drawing)
    }

    pub fn next_fire_at(&self) -> Option<Timestamp> {
        self.throttle.next_fire_at()
    }

    /// The local user cleared the board. The relay does not echo clears, so the
    /// canvas is cleared here. A pending throttled action still goes out later.
    pub fn request_clear(&mut self) -> ClientMessage {
        self.canvas.clear();
        ClientMessage::ClearCanvas
    }

    pub fn on_remote_action(&mut self, action: &DrawingAction) {
        match action {
            DrawingAction::Clear => self.on_clear_signal(),
            action => self.canvas.draw(action),
        }
    }

    /// Catch-up right after connecting: start from a blank surface, then apply
    /// in order.
    pub fn on_bulk_replay(&mut self, actions: &[DrawingAction]) {
        log::debug!("Replaying {} actions", actions.len());
        self.canvas.clear();
        for action in actions {
            self.on_remote_action(action);
        }
    }

    pub fn on_clear_signal(&mut self) {
        if self.throttle.has_pending() {
            log::debug!("Clear received with a throttled action still pending");
        }
        self.canvas.clear();
    }

    pub fn handle(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::Drawing(action) => self.on_remote_action(action),
            ServerMessage::LoadDrawing(actions) => self.on_bulk_replay(actions),
            ServerMessage::ClearCanvas => self.on_clear_signal(),
        }
    }

    pub fn handle_frame(&mut self, frame: &Frame) -> Result<(), AgentError> {
        let message: ServerMessage = WireFormat::decode_any(frame)?;
        self.handle(&message);
        Ok(())
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }
}
