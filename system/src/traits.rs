use crate::message::DrawingAction;

/// Render layer seen from the sync agent.
///
/// Implementations draw with the parameters carried by the action, never with
/// whatever tool the local user has selected.
pub trait Canvas {
    /// Called with stroke segments and shapes only; clears go to [`Canvas::clear`].
    fn draw(&mut self, action: &DrawingAction);

    fn clear(&mut self);
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn draw(&mut self, action: &DrawingAction) {
        (**self).draw(action)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}
