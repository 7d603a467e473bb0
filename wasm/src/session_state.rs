use system::{
    AgentError, Canvas, ClientMessage, ClientSyncAgent, CodecError, Frame, Point,
    PointerTracker, Publish, Timestamp, ToolSettings, WireFormat,
};

/// Everything one browser tab keeps between events: tools, the gesture in
/// progress and the sync agent. Outbound messages come back as bincode bytes
/// ready for `WebSocket.send`.
pub struct SessionState<C> {
    tools: ToolSettings,
    pointer: PointerTracker,
    agent: ClientSyncAgent<C>,
}

impl<C: Canvas> SessionState<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            tools: ToolSettings::default(),
            pointer: PointerTracker::new(),
            agent: ClientSyncAgent::new(canvas),
        }
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolSettings {
        &mut self.tools
    }

    pub fn pointer_down(&mut self, at: Point) {
        self.pointer.press(at, &self.tools);
    }

    pub fn pointer_move(&mut self, to: Point, now: Timestamp) -> Result<Option<Vec<u8>>, CodecError> {
        match self.pointer.moved(to) {
            Some(action) => outbound(self.agent.capture_local_action(action, now)),
            None => Ok(None),
        }
    }

    pub fn pointer_up(&mut self, at: Point, now: Timestamp) -> Result<Option<Vec<u8>>, CodecError> {
        match self.pointer.release(at) {
            Some(action) => outbound(self.agent.capture_local_action(action, now)),
            None => Ok(None),
        }
    }

    pub fn pointer_leave(&mut self) {
        self.pointer.leave();
    }

    pub fn fire_timer(&mut self, now: Timestamp) -> Result<Option<Vec<u8>>, CodecError> {
        self.agent.fire_timer(now).map(|m| encode(&m)).transpose()
    }

    pub fn next_timer_at(&self) -> Option<Timestamp> {
        self.agent.next_fire_at()
    }

    pub fn clear_canvas(&mut self) -> Result<Vec<u8>, CodecError> {
        encode(&self.agent.request_clear())
    }

    pub fn handle_frame(&mut self, bytes: &[u8]) -> Result<(), AgentError> {
        self.agent.handle_frame(&Frame::Binary(bytes.to_vec()))
    }

    pub fn canvas(&self) -> &C {
        self.agent.canvas()
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        self.agent.canvas_mut()
    }
}

/// Bytes to send now, or `None` when the throttle holds the action back.
fn outbound(publish: Publish<ClientMessage>) -> Result<Option<Vec<u8>>, CodecError> {
    match publish {
        Publish::Now(message) => encode(&message).map(Some),
        Publish::Deferred { fire_at } => {
            log::trace!("Publish deferred until {}", fire_at);
            Ok(None)
        }
    }
}

fn encode(message: &ClientMessage) -> Result<Vec<u8>, CodecError> {
    match WireFormat::Bincode.encode(message)? {
        Frame::Binary(bytes) => Ok(bytes),
        Frame::Text(text) => Ok(text.into_bytes()),
    }
}
