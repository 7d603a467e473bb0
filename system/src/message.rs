use crate::types::{Color, LineStyle, Point, ShapeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeSegment {
    pub start: Point,
    pub end: Point,
    pub color: Color,
    pub width: f32,
    #[serde(default)]
    pub line_style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: Color,
    pub width: f32,
}

impl Shape {
    /// Circles are centred on `start` and pass through `end`.
    pub fn radius(&self) -> f32 {
        self.start.distance_to(self.end)
    }

    /// Rectangle extent from `start`; may be negative on either axis.
    pub fn extent(&self) -> (f32, f32) {
        let d = self.end - self.start;
        (d.x, d.y)
    }
}

/// The unit of synchronization. Every visual parameter travels with the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawingAction {
    StrokeSegment(StrokeSegment),
    Shape(Shape),
    Clear,
}

impl DrawingAction {
    pub fn is_clear(&self) -> bool {
        matches!(self, DrawingAction::Clear)
    }
}

impl From<StrokeSegment> for DrawingAction {
    fn from(segment: StrokeSegment) -> Self {
        DrawingAction::StrokeSegment(segment)
    }
}

impl From<Shape> for DrawingAction {
    fn from(shape: Shape) -> Self {
        DrawingAction::Shape(shape)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    Drawing(DrawingAction),
    ClearCanvas,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerMessage {
    Drawing(DrawingAction),
    /// Bulk replay of the session log, sent once right after connecting.
    LoadDrawing(Vec<DrawingAction>),
    ClearCanvas,
}
