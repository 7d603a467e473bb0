use crate::message::DrawingAction;
use crate::traits::Canvas;

/// Vector model of a canvas: the stroke segments and shapes drawn since the
/// last clear, in draw order. Two canvases are equivalent iff their render
/// states are equal.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderState {
    actions: Vec<DrawingAction>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[DrawingAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Canvas for RenderState {
    fn draw(&mut self, action: &DrawingAction) {
        match action {
            DrawingAction::Clear => self.clear(),
            action => self.actions.push(action.clone()),
        }
    }

    fn clear(&mut self) {
        self.actions.clear();
    }
}
