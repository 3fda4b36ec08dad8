//! A two-axis joystick that snaps back to center on release.

use kurbo::Point;

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::widget::{clamp_unit, EventCtx, Widget, WidgetCore, WidgetOptions};

/// Thumb radius in pixels.
const THUMB_RADIUS: f64 = 15.0;

/// A spring-centered XY position selector.
///
/// Both axes track the pointer while pressed; on release the value
/// snaps back to `[0.5, 0.5]` and an output plus redraw are forced even
/// when the value was already centered.
pub struct Joystick {
    core: WidgetCore,
    surface: Surface,
    raw: [f64; 2],
    active: Option<PointerId>,
}

impl Joystick {
    /// Create a joystick resting at center.
    #[must_use]
    pub fn new(options: WidgetOptions) -> Self {
        let style = options.style.clone();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            raw: [0.5, 0.5],
            active: None,
        }
    }

    /// The current raw `[x, y]` value.
    #[must_use]
    pub fn raw_value(&self) -> [f64; 2] {
        self.raw
    }

    fn process_position(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let rect = self.surface.rect;
        self.raw[0] = clamp_unit((event.x - rect.x0) / rect.width());
        self.raw[1] = clamp_unit((event.y - rect.y0) / rect.height());
        let changed = self
            .core
            .pipeline
            .output(Value::Pair(self.raw), ctx.remote())?;
        if changed {
            self.draw();
        }
        Ok(())
    }

    /// Unit vector perpendicular to the center-to-thumb direction, used
    /// to give the stalk its width.
    fn perp_norm_vector(&self) -> [f64; 2] {
        let x1 = self.raw[0] - 0.5;
        let y1 = self.raw[1] - 0.5;
        if x1.abs() < 1e-9 && y1.abs() < 1e-9 {
            // Degenerate at rest: any direction works for a zero-length
            // stalk.
            return [1.0, 0.0];
        }
        // Perpendicular of (x1, y1), normalized.
        let m = x1.hypot(y1);
        [-y1 / m, x1 / m]
    }
}

impl Widget for Joystick {
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
        let (w, h) = (self.surface.width(), self.surface.height());
        let fill = self.surface.style.fill.clone();
        self.surface.begin();
        self.surface.clear_background();

        // Stalk: a quad from a narrow base at the center to the full
        // thumb width at the current position.
        let v = self.perp_norm_vector();
        let r = THUMB_RADIUS;
        let thumb = Point::new(w * self.raw[0], h * self.raw[1]);
        let center = Point::new(w * 0.5, h * 0.5);
        self.surface.fill_polygon(
            vec![
                Point::new(center.x + r * v[0] * 0.25, center.y + r * v[1] * 0.25),
                Point::new(thumb.x + r * v[0], thumb.y + r * v[1]),
                Point::new(thumb.x - r * v[0], thumb.y - r * v[1]),
                Point::new(center.x - r * v[0] * 0.25, center.y - r * v[1] * 0.25),
            ],
            fill.clone(),
        );
        self.surface.fill_circle(thumb, r, fill.clone());
        self.surface.fill_circle(center, r * 0.25, fill);
        self.surface.stroke_border();
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        self.active = Some(event.id);
        self.process_position(event, ctx)
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        if self.active == Some(event.id) {
            self.process_position(event, ctx)?;
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        if self.active == Some(event.id) {
            self.active = None;
            // Snap back to center; output and redraw are forced even if
            // the pointer released at dead center.
            self.raw = [0.5, 0.5];
            self.core
                .pipeline
                .output(Value::Pair(self.raw), ctx.remote())?;
            self.draw();
        }
        Ok(())
    }

    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let (Some(&x), Some(&y)) = (params.first(), params.get(1)) else {
            tracing::debug!("joystick external set needs [x, y], skipping");
            return Ok(());
        };
        self.raw = [clamp_unit(x), clamp_unit(y)];
        let changed = self
            .core
            .pipeline
            .output(Value::Pair(self.raw), ctx.remote())?;
        if changed {
            self.draw();
        }
        Ok(())
    }
}
