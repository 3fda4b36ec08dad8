//! A drag-to-position fader.

use kurbo::Rect;

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::widget::{clamp_unit, EventCtx, Widget, WidgetCore, WidgetOptions};

/// Which axis a slider travels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left-to-right travel; raw value grows rightward.
    Horizontal,
    /// Bottom-to-top travel; raw value grows upward.
    Vertical,
}

/// A single-axis drag-to-position slider.
pub struct Slider {
    core: WidgetCore,
    surface: Surface,
    orientation: Orientation,
    raw: f64,
    active: Option<PointerId>,
}

impl Slider {
    /// Create a slider.
    #[must_use]
    pub fn new(orientation: Orientation, options: WidgetOptions) -> Self {
        let style = options.style.clone();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            orientation,
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
        let v = match self.orientation {
            Orientation::Horizontal => (event.x - rect.x0) / rect.width(),
            Orientation::Vertical => 1.0 - (event.y - rect.y0) / rect.height(),
        };
        clamp_unit(v)
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

impl Widget for Slider {
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
        let value_rect = match self.orientation {
            Orientation::Horizontal => Rect::new(0.0, 0.0, self.raw * w, h),
            Orientation::Vertical => Rect::new(0.0, (1.0 - self.raw) * h, w, h),
        };
        self.surface.fill_rect(value_rect, fill);
        self.surface.stroke_border();
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        // A redundant down restarts the drag from the new position.
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
            tracing::debug!("slider external set with no parameters, skipping");
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

    fn ctx(timers: &mut TimerQueue) -> EventCtx<'_, '_> {
        EventCtx {
            remote: None,
            timers,
        }
    }

    fn placed(orientation: Orientation, rect: Rect) -> Slider {
        let mut slider = Slider::new(orientation, WidgetOptions::default());
        slider.surface.rect = rect;
        slider
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(1, PointerPhase::Down, x, y, 0)
    }

    #[test]
    fn horizontal_position_maps_to_fraction() {
        let mut timers = TimerQueue::new();
        let mut slider = placed(Orientation::Horizontal, Rect::new(0.0, 0.0, 200.0, 50.0));
        slider
            .on_pointer_down(&down(100.0, 25.0), &mut ctx(&mut timers))
            .unwrap();
        assert!((slider.raw_value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn vertical_position_is_inverted() {
        let mut timers = TimerQueue::new();
        let mut slider = placed(Orientation::Vertical, Rect::new(0.0, 0.0, 50.0, 100.0));
        slider
            .on_pointer_down(&down(25.0, 25.0), &mut ctx(&mut timers))
            .unwrap();
        assert!((slider.raw_value() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn positions_outside_rect_clamp_to_unit_range() {
        let mut timers = TimerQueue::new();
        let mut slider = placed(Orientation::Horizontal, Rect::new(10.0, 0.0, 210.0, 50.0));
        slider
            .on_pointer_down(&down(500.0, 25.0), &mut ctx(&mut timers))
            .unwrap();
        assert!((slider.raw_value() - 1.0).abs() < f64::EPSILON);

        slider
            .on_pointer_move(
                &PointerEvent::new(1, PointerPhase::Move, -40.0, 25.0, 1),
                &mut ctx(&mut timers),
            )
            .unwrap();
        assert!(slider.raw_value().abs() < f64::EPSILON);
    }

    #[test]
    fn moves_from_other_pointers_are_ignored() {
        let mut timers = TimerQueue::new();
        let mut slider = placed(Orientation::Horizontal, Rect::new(0.0, 0.0, 100.0, 20.0));
        slider
            .on_pointer_down(&down(50.0, 10.0), &mut ctx(&mut timers))
            .unwrap();
        slider
            .on_pointer_move(
                &PointerEvent::new(7, PointerPhase::Move, 90.0, 10.0, 1),
                &mut ctx(&mut timers),
            )
            .unwrap();
        assert!((slider.raw_value() - 0.5).abs() < f64::EPSILON);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any pointer position, however far outside the rect,
            /// produces a raw value inside the unit range.
            #[test]
            fn raw_value_always_clamped(x in -1e4f64..1e4, y in -1e4f64..1e4) {
                let mut timers = TimerQueue::new();
                let mut slider = placed(
                    Orientation::Horizontal,
                    Rect::new(100.0, 100.0, 300.0, 150.0),
                );
                slider
                    .on_pointer_down(&down(x, y), &mut ctx(&mut timers))
                    .unwrap();
                prop_assert!((0.0..=1.0).contains(&slider.raw_value()));
            }
        }
    }
}
