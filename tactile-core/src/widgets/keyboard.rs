//! A piano keyboard with polygon hit regions.

use std::collections::HashMap;

use kurbo::Point;

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::widget::{EventCtx, Widget, WidgetCore, WidgetOptions};

/// Outline class of one semitone's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyShape {
    /// White key with a notch cut out of its upper-right corner (C, F).
    Left,
    /// White key notched on both upper corners (D, G, A).
    Center,
    /// White key notched on its upper-left corner (E, B).
    Right,
    /// Black key: a plain rectangle in the upper region.
    Black,
}

/// Shape class per semitone, C through B.
const OCTAVE_SHAPES: [KeyShape; 12] = [
    KeyShape::Left,   // C
    KeyShape::Black,  // C#
    KeyShape::Center, // D
    KeyShape::Black,  // D#
    KeyShape::Right,  // E
    KeyShape::Left,   // F
    KeyShape::Black,  // F#
    KeyShape::Center, // G
    KeyShape::Black,  // G#
    KeyShape::Center, // A
    KeyShape::Black,  // A#
    KeyShape::Right,  // B
];

/// White-key column per semitone (`None` for black keys).
const WHITE_COLUMN: [Option<usize>; 12] = [
    Some(0), // C
    None,
    Some(1), // D
    None,
    Some(2), // E
    Some(3), // F
    None,
    Some(4), // G
    None,
    Some(5), // A
    None,
    Some(6), // B
];

/// Fraction of the white key width a black key occupies.
const BLACK_WIDTH_RATIO: f64 = 0.6;

/// Fraction of the keyboard height a black key covers.
const BLACK_HEIGHT_RATIO: f64 = 0.6;

/// Even-odd point-in-polygon test.
///
/// Casts a ray along +y and counts edges that straddle the point's x;
/// an odd crossing count below the point means inside.
#[must_use]
pub fn point_in_polygon(pt: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[j], polygon[i]);
        if (a.x > pt.x) != (b.x > pt.x) {
            let y_at_x = a.y + (b.y - a.y) * (pt.x - a.x) / (b.x - a.x);
            if pt.y < y_at_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A multi-octave piano keyboard.
///
/// Key polygons are derived once at placement time from the semitone
/// shape table; presses and releases resolve keys with an even-odd
/// ray-cast against those polygons and emit per-key-index output.
pub struct Keyboard {
    core: WidgetCore,
    surface: Surface,
    octaves: usize,
    values: Vec<f64>,
    /// Per-key outlines in surface-local coordinates, semitone order.
    polygons: Vec<Vec<Point>>,
    /// Last pressed key per active pointer.
    sessions: HashMap<PointerId, usize>,
}

impl Keyboard {
    /// Create a keyboard spanning `octaves` octaves.
    #[must_use]
    pub fn new(octaves: usize, options: WidgetOptions) -> Self {
        let style = options.style.clone();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            octaves,
            values: vec![0.0; octaves * 12],
            polygons: Vec::new(),
            sessions: HashMap::new(),
        }
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the keyboard has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value of one key (1 while pressed).
    #[must_use]
    pub fn key_value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// The key outlines, once placed.
    #[must_use]
    pub fn polygons(&self) -> &[Vec<Point>] {
        &self.polygons
    }

    #[allow(clippy::cast_precision_loss)]
    fn build_polygons(&mut self) {
        let (w, h) = (self.surface.width(), self.surface.height());
        let white_w = w / (7.0 * self.octaves as f64);
        let black_w = white_w * BLACK_WIDTH_RATIO;
        let black_h = h * BLACK_HEIGHT_RATIO;
        let notch = black_w / 2.0;

        self.polygons.clear();
        for octave in 0..self.octaves {
            for (semitone, &shape) in OCTAVE_SHAPES.iter().enumerate() {
                let polygon = match shape {
                    KeyShape::Black => {
                        // Centered on the boundary with the next white
                        // column.
                        let left_column = WHITE_COLUMN[semitone - 1]
                            .expect("black keys always follow a white key");
                        let cx = (octave * 7 + left_column + 1) as f64 * white_w;
                        vec![
                            Point::new(cx - notch, 0.0),
                            Point::new(cx + notch, 0.0),
                            Point::new(cx + notch, black_h),
                            Point::new(cx - notch, black_h),
                        ]
                    }
                    white => {
                        let column = WHITE_COLUMN[semitone]
                            .expect("white shapes map to a white column");
                        let x0 = (octave * 7 + column) as f64 * white_w;
                        let x1 = x0 + white_w;
                        match white {
                            KeyShape::Left => vec![
                                Point::new(x0, 0.0),
                                Point::new(x1 - notch, 0.0),
                                Point::new(x1 - notch, black_h),
                                Point::new(x1, black_h),
                                Point::new(x1, h),
                                Point::new(x0, h),
                            ],
                            KeyShape::Center => vec![
                                Point::new(x0 + notch, 0.0),
                                Point::new(x1 - notch, 0.0),
                                Point::new(x1 - notch, black_h),
                                Point::new(x1, black_h),
                                Point::new(x1, h),
                                Point::new(x0, h),
                                Point::new(x0, black_h),
                                Point::new(x0 + notch, black_h),
                            ],
                            KeyShape::Right => vec![
                                Point::new(x0 + notch, 0.0),
                                Point::new(x1, 0.0),
                                Point::new(x1, h),
                                Point::new(x0, h),
                                Point::new(x0, black_h),
                                Point::new(x0 + notch, black_h),
                            ],
                            KeyShape::Black => unreachable!("matched above"),
                        }
                    }
                };
                self.polygons.push(polygon);
            }
        }

        // The last octave's B key loses its right notch neighbor; no
        // black key sits past it, so nothing overlaps either way.
    }

    /// The key under an absolute position, if any.
    #[must_use]
    pub fn key_at(&self, x: f64, y: f64) -> Option<usize> {
        let rect = self.surface.rect;
        let local = Point::new(x - rect.x0, y - rect.y0);
        self.polygons
            .iter()
            .position(|polygon| point_in_polygon(local, polygon))
    }

    fn emit(&mut self, index: usize, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let changed = self.core.pipeline.output_at(
            Some(index),
            Value::Scalar(self.values[index]),
            ctx.remote(),
        )?;
        if changed {
            self.draw();
        }
        Ok(())
    }
}

impl Widget for Keyboard {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    fn draw(&mut self) {
        let fill = self.surface.style.fill.clone();
        // Paint whites first so the black rectangles sit on top.
        let mut commands: Vec<(usize, Vec<Point>, String)> = Vec::new();
        for (index, polygon) in self.polygons.iter().enumerate() {
            let pressed = self.values[index] >= 0.5;
            let color = if pressed {
                fill.clone()
            } else if OCTAVE_SHAPES[index % 12] == KeyShape::Black {
                "#000000".to_string()
            } else {
                "#ffffff".to_string()
            };
            let order = usize::from(OCTAVE_SHAPES[index % 12] == KeyShape::Black);
            commands.push((order, polygon.clone(), color));
        }
        commands.sort_by_key(|(order, _, _)| *order);

        self.surface.begin();
        self.surface.clear_background();
        for (_, polygon, color) in commands {
            self.surface.fill_polygon(polygon, color);
        }
        self.surface.stroke_border();
    }

    fn on_place(&mut self) {
        self.build_polygons();
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let Some(index) = self.key_at(event.x, event.y) else {
            return Ok(());
        };
        self.values[index] = 1.0;
        self.sessions.insert(event.id, index);
        self.emit(index, ctx)
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        self.sessions.remove(&event.id);
        // The release resolves against the up position, like the press.
        let Some(index) = self.key_at(event.x, event.y) else {
            return Ok(());
        };
        self.values[index] = 0.0;
        self.emit(index, ctx)
    }

    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let (Some(&index), Some(&v)) = (params.first(), params.get(1)) else {
            tracing::debug!("keyboard external set needs [index, value], skipping");
            return Ok(());
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = index.max(0.0) as usize;
        if index >= self.values.len() {
            tracing::debug!(index, "keyboard external set out of range, skipping");
            return Ok(());
        }
        self.values[index] = if v >= 0.5 { 1.0 } else { 0.0 };
        self.emit(index, ctx)
    }
}
