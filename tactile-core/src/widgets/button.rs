//! A single press button with toggle, hold and momentary styles.

use kurbo::Rect;

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::timer::{TimerHandle, TimerTask};
use crate::widget::{EventCtx, Widget, WidgetCore, WidgetOptions};

/// Delay before a momentary button resets to zero, in milliseconds.
pub const MOMENTARY_RESET_MS: u64 = 50;

/// Press behavior of a [`Button`] (and of each cell of a
/// [`ButtonGrid`](crate::widgets::ButtonGrid)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonMode {
    /// Each press flips the value between 0 and 1.
    Toggle,
    /// A press sets 1; the matching release sets 0.
    Hold,
    /// A press sets 1 and schedules a reset to 0 shortly after,
    /// independent of the release.
    Momentary,
}

/// A single on/off button.
pub struct Button {
    core: WidgetCore,
    surface: Surface,
    mode: ButtonMode,
    raw: f64,
    active: Option<PointerId>,
    pending_reset: Option<TimerHandle>,
}

impl Button {
    /// Create a button.
    #[must_use]
    pub fn new(mode: ButtonMode, options: WidgetOptions) -> Self {
        let style = options.style.clone();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            mode,
            raw: 0.0,
            active: None,
            pending_reset: None,
        }
    }

    /// The current raw value (0 or 1).
    #[must_use]
    pub fn raw_value(&self) -> f64 {
        self.raw
    }

    fn emit(&mut self, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<bool> {
        let changed = self
            .core
            .pipeline
            .output(Value::Scalar(self.raw), ctx.remote())?;
        if changed {
            self.draw();
        }
        Ok(changed)
    }
}

impl Widget for Button {
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
        if self.raw >= 0.5 {
            self.surface.fill_rect(Rect::new(0.0, 0.0, w, h), fill);
        }
        self.surface.stroke_border();
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        match self.mode {
            ButtonMode::Toggle => {
                self.raw = if self.raw >= 0.5 { 0.0 } else { 1.0 };
                self.emit(ctx)?;
            }
            ButtonMode::Hold => {
                self.active = Some(event.id);
                self.raw = 1.0;
                self.emit(ctx)?;
            }
            ButtonMode::Momentary => {
                self.raw = 1.0;
                self.emit(ctx)?;
                // A re-press supersedes any reset still in flight, so a
                // rapid second press cannot be cut short by the first
                // press's timer.
                if let Some(handle) = self.pending_reset.take() {
                    ctx.timers.cancel(handle);
                }
                self.pending_reset = Some(ctx.timers.schedule(
                    event.timestamp_ms + MOMENTARY_RESET_MS,
                    TimerTask::MomentaryReset {
                        widget: self.core.id,
                        index: 0,
                    },
                ));
            }
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        // Only the hold style cares about release at all.
        if self.mode == ButtonMode::Hold && self.active == Some(event.id) {
            self.active = None;
            self.raw = 0.0;
            self.emit(ctx)?;
        }
        Ok(())
    }

    fn on_timer(&mut self, task: TimerTask, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let TimerTask::MomentaryReset { .. } = task;
        self.pending_reset = None;
        self.raw = 0.0;
        self.emit(ctx)?;
        Ok(())
    }

    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let Some(&v) = params.first() else {
            tracing::debug!("button external set with no parameters, skipping");
            return Ok(());
        };
        self.raw = if v >= 0.5 { 1.0 } else { 0.0 };
        self.emit(ctx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerPhase;
    use crate::timer::TimerQueue;
    use std::sync::{Arc, Mutex};

    fn ctx(timers: &mut TimerQueue) -> EventCtx<'_, '_> {
        EventCtx {
            remote: None,
            timers,
        }
    }

    fn down(ts: u64) -> PointerEvent {
        PointerEvent::new(1, PointerPhase::Down, 5.0, 5.0, ts)
    }

    fn up(ts: u64) -> PointerEvent {
        PointerEvent::new(1, PointerPhase::Up, 5.0, 5.0, ts)
    }

    fn observed(mode: ButtonMode) -> (Button, Arc<Mutex<Vec<(Value, Option<Value>)>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let button = Button::new(
            mode,
            WidgetOptions {
                on_change: Some(Box::new(move |e| {
                    sink.lock().unwrap().push((e.value, e.previous));
                })),
                ..WidgetOptions::default()
            },
        );
        (button, events)
    }

    #[test]
    fn toggle_two_presses_returns_to_original() {
        let mut timers = TimerQueue::new();
        let (mut button, events) = observed(ButtonMode::Toggle);

        button.on_pointer_down(&down(0), &mut ctx(&mut timers)).unwrap();
        assert!((button.raw_value() - 1.0).abs() < f64::EPSILON);
        button.on_pointer_down(&down(10), &mut ctx(&mut timers)).unwrap();
        assert!(button.raw_value().abs() < f64::EPSILON);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (Value::Scalar(1.0), None));
        assert_eq!(events[1], (Value::Scalar(0.0), Some(Value::Scalar(1.0))));
    }

    #[test]
    fn hold_press_release_emits_one_then_zero() {
        let mut timers = TimerQueue::new();
        let (mut button, events) = observed(ButtonMode::Hold);

        button.on_pointer_down(&down(0), &mut ctx(&mut timers)).unwrap();
        button.on_pointer_up(&up(40), &mut ctx(&mut timers)).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                (Value::Scalar(1.0), None),
                (Value::Scalar(0.0), Some(Value::Scalar(1.0))),
            ]
        );
    }

    #[test]
    fn hold_ignores_unrelated_pointer_release() {
        let mut timers = TimerQueue::new();
        let (mut button, _) = observed(ButtonMode::Hold);
        button.on_pointer_down(&down(0), &mut ctx(&mut timers)).unwrap();
        button
            .on_pointer_up(
                &PointerEvent::new(9, PointerPhase::Up, 5.0, 5.0, 10),
                &mut ctx(&mut timers),
            )
            .unwrap();
        assert!((button.raw_value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn momentary_schedules_reset() {
        let mut timers = TimerQueue::new();
        let (mut button, _) = observed(ButtonMode::Momentary);
        button.on_pointer_down(&down(100), &mut ctx(&mut timers)).unwrap();
        assert!((button.raw_value() - 1.0).abs() < f64::EPSILON);
        assert_eq!(timers.pending(), 1);

        // Not due yet.
        assert!(timers.drain_due(100 + MOMENTARY_RESET_MS - 1).is_empty());
        let due = timers.drain_due(100 + MOMENTARY_RESET_MS);
        assert_eq!(due.len(), 1);
        button.on_timer(due[0], &mut ctx(&mut timers)).unwrap();
        assert!(button.raw_value().abs() < f64::EPSILON);
    }

    #[test]
    fn momentary_repress_cancels_stale_reset() {
        let mut timers = TimerQueue::new();
        let (mut button, _) = observed(ButtonMode::Momentary);
        button.on_pointer_down(&down(100), &mut ctx(&mut timers)).unwrap();
        // Second press 20ms later, while the first reset is pending.
        button.on_pointer_down(&down(120), &mut ctx(&mut timers)).unwrap();

        // Only the rescheduled reset survives; the stale one cannot cut
        // the second press short.
        assert_eq!(timers.pending(), 1);
        assert!(timers.drain_due(120 + MOMENTARY_RESET_MS - 1).is_empty());
        assert_eq!(timers.drain_due(120 + MOMENTARY_RESET_MS).len(), 1);
    }
}
