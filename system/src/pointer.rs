use crate::message::{DrawingAction, Shape, StrokeSegment};
use crate::types::{Color, LineStyle, Point, ShapeKind};

/// The local user's current tool choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub color: Color,
    pub width: f32,
    pub line_style: LineStyle,
    /// `None` means freehand.
    pub shape: Option<ShapeKind>,
    pub erasing: bool,
}

impl ToolSettings {
    pub fn toggle_eraser(&mut self) {
        self.erasing = !self.erasing;
        self.shape = None;
        self.line_style = LineStyle::Solid;
    }

    /// Back to a plain freehand brush, keeping color and width.
    pub fn use_normal_brush(&mut self) {
        self.erasing = false;
        self.shape = None;
        self.line_style = LineStyle::Solid;
    }

    /// Erasing paints the background color with a solid line.
    fn stroke(&self) -> (Color, LineStyle) {
        if self.erasing {
            (Color::WHITE, LineStyle::Solid)
        } else {
            (self.color, self.line_style)
        }
    }
}

impl std::default::Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5.0,
            line_style: LineStyle::Solid,
            shape: None,
            erasing: false,
        }
    }
}

#[derive(Debug)]
enum Gesture {
    Idle,
    Freehand { tools: ToolSettings, previous: Point },
    Shape { tools: ToolSettings, kind: ShapeKind, origin: Point },
}

/// Turns pointer events into drawing actions.
///
/// Tools are snapshotted on press, so changing them mid-gesture only affects
/// the next gesture.
#[derive(Debug)]
pub struct PointerTracker {
    gesture: Gesture,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }

    pub fn press(&mut self, at: Point, tools: &ToolSettings) {
        let shape = tools.shape.filter(|_| !tools.erasing);
        let tools = tools.clone();
        self.gesture = match shape {
            Some(kind) => Gesture::Shape {
                tools,
                kind,
                origin: at,
            },
            _ => Gesture::Freehand {
                tools,
                previous: at,
            },
        };
    }

    /// Emits the segment from the previous point while drawing freehand.
    pub fn moved(&mut self, to: Point) -> Option<DrawingAction> {
        match &mut self.gesture {
            Gesture::Freehand { tools, previous } => {
                let (color, line_style) = tools.stroke();
                let segment = StrokeSegment {
                    start: *previous,
                    end: to,
                    color,
                    width: tools.width,
                    line_style,
                };
                *previous = to;
                Some(segment.into())
            }
            _ => None,
        }
    }

    /// Ends the gesture; a shape gesture emits its completed shape.
    pub fn release(&mut self, at: Point) -> Option<DrawingAction> {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Shape {
                tools,
                kind,
                origin,
            } => Some(
                Shape {
                    kind,
                    start: origin,
                    end: at,
                    color: tools.color,
                    width: tools.width,
                }
                .into(),
            ),
            _ => None,
        }
    }

    /// Pointer left the surface. Drops the gesture without emitting anything.
    pub fn leave(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn is_drawing(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }
}

impl std::default::Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}
