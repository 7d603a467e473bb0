use crate::message::DrawingAction;

/// Drawing history since the last clear, in server arrival order.
///
/// Never contains [`DrawingAction::Clear`]: recording a clear truncates the log instead.
#[derive(Debug, Default, Clone)]
pub struct SessionLog {
    actions: Vec<DrawingAction>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: DrawingAction) {
        if action.is_clear() {
            self.clear();
        } else {
            self.actions.push(action);
        }
    }

    pub fn clear(&mut self) {
        log::debug!("Session log cleared ({} actions dropped)", self.actions.len());
        self.actions.clear();
    }

    /// Copy of the whole log, as sent in a bulk replay.
    pub fn replay(&self) -> Vec<DrawingAction> {
        self.actions.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawingAction> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
