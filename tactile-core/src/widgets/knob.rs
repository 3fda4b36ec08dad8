//! A rotary control with linear or rotational drag mapping.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::Point;

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::widget::{clamp_unit, EventCtx, Widget, WidgetCore, WidgetOptions};

/// How pointer positions map onto the knob's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobMapping {
    /// Vertical drag, like an upright slider laid over the knob.
    Linear,
    /// Absolute rotation: the value follows the angle of the pointer
    /// around the knob center.
    Rotational,
}

/// A rotary drag-to-position control.
///
/// The rotational mapping places the 0/1 seam at the bottom of the dial
/// and corrects wraparound so a drag across the seam snaps to the nearer
/// end instead of jumping across the whole range.
pub struct Knob {
    core: WidgetCore,
    surface: Surface,
    mapping: KnobMapping,
    raw: f64,
    active: Option<PointerId>,
}

impl Knob {
    /// Create a knob.
    #[must_use]
    pub fn new(mapping: KnobMapping, options: WidgetOptions) -> Self {
        let style = options.style.clone();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            mapping,
            raw: 0.0,
            active: None,
        }
    }

    /// The current raw (unit-normalized) value.
    #[must_use]
    pub fn raw_value(&self) -> f64 {
        self.raw
    }

    fn position_to_raw(&self, event: &PointerEvent) -> f64 {
        let rect = self.surface.rect;
        match self.mapping {
            KnobMapping::Linear => clamp_unit(1.0 - (event.y - rect.y0) / rect.height()),
            KnobMapping::Rotational => {
                let center = rect.center();
                let theta = (event.y - center.y).atan2(event.x - center.x);
                // Seam at six o'clock: angle 0..1 runs one full turn
                // clockwise from the bottom of the dial.
                let angle = ((theta - FRAC_PI_2) / TAU).rem_euclid(1.0);
                // Wraparound correction: a drag across the seam snaps to
                // the nearer end instead of jumping the whole range.
                if self.raw > 0.8 && angle < 0.2 {
                    1.0
                } else if self.raw < 0.2 && angle > 0.8 {
                    0.0
                } else {
                    angle
                }
            }
        }
    }

    fn process_position(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        self.raw = self.position_to_raw(event);
        let changed = self
            .core
            .pipeline
            .output(Value::Scalar(self.raw), ctx.remote())?;
        if changed {
            self.draw();
        }
        Ok(())
    }
}

impl Widget for Knob {
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
        let stroke = self.surface.style.stroke.clone();
        self.surface.begin();
        self.surface.clear_background();

        let center = Point::new(w / 2.0, h / 2.0);
        let radius = w.min(h) / 2.0 - 2.0;
        self.surface.fill_circle(center, radius, fill);

        // Indicator from the center to the rim at the value's angle.
        let theta = self.raw * TAU + FRAC_PI_2;
        let tip = Point::new(
            center.x + radius * theta.cos(),
            center.y + radius * theta.sin(),
        );
        self.surface.line(center, tip, stroke);
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

    fn on_pointer_up(&mut self, event: &PointerEvent, _ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        if self.active == Some(event.id) {
            self.active = None;
        }
        Ok(())
    }

    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let Some(&v) = params.first() else {
            tracing::debug!("knob external set with no parameters, skipping");
            return Ok(());
        };
        self.raw = clamp_unit(v);
        let changed = self
            .core
            .pipeline
            .output(Value::Scalar(self.raw), ctx.remote())?;
        if changed {
            self.draw();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerPhase;
    use crate::timer::TimerQueue;
    use kurbo::Rect;

    fn ctx(timers: &mut TimerQueue) -> EventCtx<'_, '_> {
        EventCtx {
            remote: None,
            timers,
        }
    }

    fn placed(mapping: KnobMapping) -> Knob {
        let mut knob = Knob::new(mapping, WidgetOptions::default());
        // 100x100 square centered at (50, 50).
        knob.surface.rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        knob
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(1, PointerPhase::Down, x, y, 0)
    }

    fn drag(knob: &mut Knob, x: f64, y: f64, timers: &mut TimerQueue) {
        knob.on_pointer_move(
            &PointerEvent::new(1, PointerPhase::Move, x, y, 1),
            &mut ctx(timers),
        )
        .unwrap();
    }

    #[test]
    fn linear_mapping_matches_vertical_slider() {
        let mut timers = TimerQueue::new();
        let mut knob = placed(KnobMapping::Linear);
        knob.on_pointer_down(&down(50.0, 25.0), &mut ctx(&mut timers))
            .unwrap();
        assert!((knob.raw_value() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn rotational_angle_is_measured_from_center() {
        let mut timers = TimerQueue::new();
        let mut knob = placed(KnobMapping::Rotational);
        // Directly below center: the seam. atan2 gives pi/2, the seam
        // offset maps it to 0.
        knob.on_pointer_down(&down(50.0, 90.0), &mut ctx(&mut timers))
            .unwrap();
        assert!(knob.raw_value().abs() < 1e-9);

        // Directly left of center: a quarter turn past the seam.
        drag(&mut knob, 10.0, 50.0, &mut timers);
        assert!((knob.raw_value() - 0.25).abs() < 1e-9);

        // Directly above center: half a turn.
        drag(&mut knob, 50.0, 10.0, &mut timers);
        assert!((knob.raw_value() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn wraparound_snaps_high_value_to_one() {
        let mut timers = TimerQueue::new();
        let mut knob = placed(KnobMapping::Rotational);
        knob.raw = 0.85;
        // An angle mapping to ~0.1 (just past the seam, clockwise):
        // theta = 0.1 * TAU + pi/2.
        let theta = 0.1 * TAU + FRAC_PI_2;
        let (x, y) = (50.0 + 30.0 * theta.cos(), 50.0 + 30.0 * theta.sin());
        knob.on_pointer_down(&down(x, y), &mut ctx(&mut timers))
            .unwrap();
        assert!((knob.raw_value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wraparound_snaps_low_value_to_zero() {
        let mut timers = TimerQueue::new();
        let mut knob = placed(KnobMapping::Rotational);
        knob.raw = 0.1;
        let theta = 0.9 * TAU + FRAC_PI_2;
        let (x, y) = (50.0 + 30.0 * theta.cos(), 50.0 + 30.0 * theta.sin());
        knob.on_pointer_down(&down(x, y), &mut ctx(&mut timers))
            .unwrap();
        assert!(knob.raw_value().abs() < f64::EPSILON);
    }

    #[test]
    fn mid_range_angles_pass_through_unsnapped() {
        let mut timers = TimerQueue::new();
        let mut knob = placed(KnobMapping::Rotational);
        knob.raw = 0.5;
        let theta = 0.4 * TAU + FRAC_PI_2;
        let (x, y) = (50.0 + 30.0 * theta.cos(), 50.0 + 30.0 * theta.sin());
        knob.on_pointer_down(&down(x, y), &mut ctx(&mut timers))
            .unwrap();
        assert!((knob.raw_value() - 0.4).abs() < 1e-9);
    }
}
