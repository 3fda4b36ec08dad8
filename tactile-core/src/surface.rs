//! Per-widget drawing surfaces.
//!
//! Rendering fidelity is out of scope for the toolkit: widgets record a
//! display list of [`DrawCommand`]s into their [`Surface`] and the host
//! replays it onto whatever canvas it owns. The recorded list is the
//! testable rendering contract.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Visual style attributes for a widget surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// Fill color for value representation, as hex.
    pub fill: String,
    /// Stroke color for borders, as hex.
    pub stroke: String,
    /// Background color, as hex.
    pub background: String,
    /// Stroke line width in pixels.
    pub line_width: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: "#777777".to_string(),
            stroke: "#ffffff".to_string(),
            background: "#333333".to_string(),
            line_width: 1,
        }
    }
}

/// One recorded drawing operation, in surface-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill an axis-aligned rectangle.
    FillRect {
        /// Rectangle in local coordinates.
        rect: Rect,
        /// Fill color as hex.
        color: String,
    },
    /// Stroke an axis-aligned rectangle outline.
    StrokeRect {
        /// Rectangle in local coordinates.
        rect: Rect,
        /// Stroke color as hex.
        color: String,
        /// Line width in pixels.
        line_width: u32,
    },
    /// Fill a circle.
    FillCircle {
        /// Center in local coordinates.
        center: Point,
        /// Radius in pixels.
        radius: f64,
        /// Fill color as hex.
        color: String,
    },
    /// Fill a closed polygon.
    FillPolygon {
        /// Vertices in local coordinates.
        points: Vec<Point>,
        /// Fill color as hex.
        color: String,
    },
    /// Stroke a line segment.
    Line {
        /// Segment start in local coordinates.
        from: Point,
        /// Segment end in local coordinates.
        to: Point,
        /// Stroke color as hex.
        color: String,
        /// Line width in pixels.
        line_width: u32,
    },
}

/// A widget's drawing surface: style, placed rectangle and the recorded
/// display list.
#[derive(Debug, Default)]
pub struct Surface {
    /// Visual style attributes.
    pub style: Style,
    /// Absolute bounding box, assigned at placement time.
    pub rect: Rect,
    commands: Vec<DrawCommand>,
}

impl Surface {
    /// Create a surface with the given style.
    #[must_use]
    pub fn new(style: Style) -> Self {
        Self {
            style,
            rect: Rect::ZERO,
            commands: Vec::new(),
        }
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    /// Clear the display list; widgets call this at the top of `draw`.
    pub fn begin(&mut self) {
        self.commands.clear();
    }

    /// Fill the whole surface with the background color.
    pub fn clear_background(&mut self) {
        let rect = Rect::new(0.0, 0.0, self.width(), self.height());
        let color = self.style.background.clone();
        self.fill_rect(rect, color);
    }

    /// Stroke the whole surface border with the stroke color.
    pub fn stroke_border(&mut self) {
        let rect = Rect::new(0.0, 0.0, self.width(), self.height());
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: self.style.stroke.clone(),
            line_width: self.style.line_width,
        });
    }

    /// Record a filled rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: impl Into<String>) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: color.into(),
        });
    }

    /// Record a stroked rectangle outline using the style line width.
    pub fn stroke_rect(&mut self, rect: Rect, color: impl Into<String>) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: color.into(),
            line_width: self.style.line_width,
        });
    }

    /// Record a filled circle.
    pub fn fill_circle(&mut self, center: Point, radius: f64, color: impl Into<String>) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color: color.into(),
        });
    }

    /// Record a filled polygon.
    pub fn fill_polygon(&mut self, points: Vec<Point>, color: impl Into<String>) {
        self.commands.push(DrawCommand::FillPolygon {
            points,
            color: color.into(),
        });
    }

    /// Record a line segment.
    pub fn line(&mut self, from: Point, to: Point, color: impl Into<String>) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color: color.into(),
            line_width: self.style.line_width,
        });
    }

    /// The recorded display list since the last [`Surface::begin`].
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_clears_previous_commands() {
        let mut surface = Surface::new(Style::default());
        surface.rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        surface.clear_background();
        surface.stroke_border();
        assert_eq!(surface.commands().len(), 2);

        surface.begin();
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn background_covers_local_rect() {
        let mut surface = Surface::new(Style::default());
        surface.rect = Rect::new(50.0, 20.0, 250.0, 60.0);
        surface.clear_background();
        match &surface.commands()[0] {
            DrawCommand::FillRect { rect, .. } => {
                // Local coordinates, not absolute.
                assert_eq!(*rect, Rect::new(0.0, 0.0, 200.0, 40.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
