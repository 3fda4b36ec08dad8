//! Panel placement, hit testing and pointer capture.
//!
//! The panel owns its widgets. A pointer-down hit-tests widget rects
//! (topmost first) and records a capture for that pointer; moves and ups
//! route to the capturing widget until release. This replaces the
//! per-event listener churn of a DOM host: capture is established once
//! per press and torn down on the matching release.

use std::collections::HashMap;

use kurbo::Point;

use crate::error::{WidgetError, WidgetResult};
use crate::event::{PointerEvent, PointerId, PointerPhase};
use crate::pipeline::RemoteSender;
use crate::registry::Registry;
use crate::timer::TimerQueue;
use crate::widget::{EventCtx, Widget, WidgetId};

/// A placement and event-routing context for widgets.
pub struct Panel {
    width: f64,
    height: f64,
    widgets: HashMap<WidgetId, Box<dyn Widget>>,
    /// Insertion order; later widgets sit on top for hit testing.
    order: Vec<WidgetId>,
    /// Active pointer captures.
    capture: HashMap<PointerId, WidgetId>,
    timers: TimerQueue,
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("widgets", &self.order.len())
            .field("captures", &self.capture.len())
            .finish()
    }
}

impl Panel {
    /// Create an empty panel with the given size in pixels.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            widgets: HashMap::new(),
            order: Vec::new(),
            capture: HashMap::new(),
            timers: TimerQueue::new(),
        }
    }

    /// Panel width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Panel height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Number of widgets attached.
    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.order.len()
    }

    /// Number of pending deferred tasks.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Attach a widget: resolve its fractional bounds to an absolute
    /// rect, run its placement hook, draw it once, and register its key.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::AlreadyPlaced`] if the widget was attached
    /// before.
    pub fn add(
        &mut self,
        mut widget: Box<dyn Widget>,
        registry: &mut Registry,
    ) -> WidgetResult<WidgetId> {
        if widget.core().placement.placed {
            return Err(WidgetError::AlreadyPlaced);
        }
        let rect = widget.core().placement.resolve(self.width, self.height);
        widget.surface_mut().rect = rect;
        widget.core_mut().placement.placed = true;
        widget.on_place();
        widget.draw();

        let id = widget.core().id;
        if let Some(key) = widget.core().key() {
            registry.register(key.to_string(), id);
        }
        self.widgets.insert(id, widget);
        self.order.push(id);
        Ok(id)
    }

    /// Detach a widget, releasing its captures and registry entry.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::WidgetNotFound`] if the widget is not
    /// attached to this panel.
    pub fn remove(
        &mut self,
        id: WidgetId,
        registry: &mut Registry,
    ) -> WidgetResult<Box<dyn Widget>> {
        let widget = self
            .widgets
            .remove(&id)
            .ok_or(WidgetError::WidgetNotFound(id))?;
        self.order.retain(|&other| other != id);
        self.capture.retain(|_, &mut holder| holder != id);
        if let Some(key) = widget.core().key() {
            registry.unregister(key);
        }
        Ok(widget)
    }

    /// Borrow a widget by ID.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.widgets.get(&id).map(AsRef::as_ref)
    }

    /// Mutably borrow a widget by ID.
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        self.widgets.get_mut(&id).map(AsMut::as_mut)
    }

    /// The topmost widget whose rect contains `point`.
    #[must_use]
    pub fn widget_at(&self, point: Point) -> Option<WidgetId> {
        self.order
            .iter()
            .rev()
            .find(|id| {
                self.widgets
                    .get(id)
                    .is_some_and(|w| w.surface().rect.contains(point))
            })
            .copied()
    }

    /// Route a pointer event to the captured or hit widget.
    ///
    /// Returns the widget the event reached, if any. A down outside
    /// every widget and a move/up with no matching capture are no-ops; an
    /// unmatched up is traced for diagnostics but never an error.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the receiving widget.
    pub fn dispatch_pointer(
        &mut self,
        event: &PointerEvent,
        remote: Option<&mut (dyn RemoteSender + '_)>,
    ) -> WidgetResult<Option<WidgetId>> {
        match event.phase {
            PointerPhase::Down => {
                let Some(id) = self.widget_at(event.position()) else {
                    return Ok(None);
                };
                // A redundant down on an active pointer restarts the
                // interaction on whatever widget is under it now.
                self.capture.insert(event.id, id);
                let widget = self
                    .widgets
                    .get_mut(&id)
                    .ok_or(WidgetError::WidgetNotFound(id))?;
                let mut ctx = EventCtx {
                    remote,
                    timers: &mut self.timers,
                };
                widget.on_pointer_down(event, &mut ctx)?;
                Ok(Some(id))
            }
            PointerPhase::Move => {
                let Some(&id) = self.capture.get(&event.id) else {
                    return Ok(None);
                };
                let widget = self
                    .widgets
                    .get_mut(&id)
                    .ok_or(WidgetError::WidgetNotFound(id))?;
                let mut ctx = EventCtx {
                    remote,
                    timers: &mut self.timers,
                };
                widget.on_pointer_move(event, &mut ctx)?;
                Ok(Some(id))
            }
            PointerPhase::Up => {
                let Some(id) = self.capture.remove(&event.id) else {
                    tracing::debug!(pointer = %event.id, "pointer up with no matching capture");
                    return Ok(None);
                };
                let widget = self
                    .widgets
                    .get_mut(&id)
                    .ok_or(WidgetError::WidgetNotFound(id))?;
                let mut ctx = EventCtx {
                    remote,
                    timers: &mut self.timers,
                };
                widget.on_pointer_up(event, &mut ctx)?;
                Ok(Some(id))
            }
        }
    }

    /// Fire every deferred task due at or before `now_ms`.
    ///
    /// Tasks whose widget has since been removed are dropped with a
    /// debug trace.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the receiving widget.
    pub fn run_timers(
        &mut self,
        now_ms: u64,
        mut remote: Option<&mut (dyn RemoteSender + '_)>,
    ) -> WidgetResult<()> {
        for task in self.timers.drain_due(now_ms) {
            let id = task.widget();
            let Some(widget) = self.widgets.get_mut(&id) else {
                tracing::debug!(widget = %id, "dropping timer task for removed widget");
                continue;
            };
            let mut ctx = EventCtx {
                remote: remote.as_deref_mut(),
                timers: &mut self.timers,
            };
            widget.on_timer(task, &mut ctx)?;
        }
        Ok(())
    }

    /// Advance one animation frame for every widget that wants it.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from a stepping widget.
    pub fn step_animation(
        &mut self,
        mut remote: Option<&mut (dyn RemoteSender + '_)>,
    ) -> WidgetResult<()> {
        let ids: Vec<WidgetId> = self.order.clone();
        for id in ids {
            let Some(widget) = self.widgets.get_mut(&id) else {
                continue;
            };
            if !widget.wants_animation() {
                continue;
            }
            let mut ctx = EventCtx {
                remote: remote.as_deref_mut(),
                timers: &mut self.timers,
            };
            widget.step(&mut ctx)?;
        }
        Ok(())
    }

    /// Deliver an externally supplied value to a widget (inbound remote
    /// routing).
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::WidgetNotFound`] for an unknown widget and
    /// propagates transmission failures from the widget's output path.
    pub fn apply_external(
        &mut self,
        id: WidgetId,
        params: &[f64],
        remote: Option<&mut (dyn RemoteSender + '_)>,
    ) -> WidgetResult<()> {
        let widget = self
            .widgets
            .get_mut(&id)
            .ok_or(WidgetError::WidgetNotFound(id))?;
        let mut ctx = EventCtx {
            remote,
            timers: &mut self.timers,
        };
        widget.set_value_external(params, &mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Style, Surface};
    use crate::widget::{WidgetCore, WidgetOptions};

    /// Minimal widget recording which hooks fired.
    struct Probe {
        core: WidgetCore,
        surface: Surface,
        downs: usize,
        moves: usize,
        ups: usize,
    }

    impl Probe {
        fn boxed(bounds: kurbo::Rect) -> Box<Self> {
            Box::new(Self {
                core: WidgetCore::new(WidgetOptions {
                    bounds,
                    ..WidgetOptions::default()
                }),
                surface: Surface::new(Style::default()),
                downs: 0,
                moves: 0,
                ups: 0,
            })
        }
    }

    impl Widget for Probe {
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
        fn draw(&mut self) {}
        fn on_pointer_down(
            &mut self,
            _event: &PointerEvent,
            _ctx: &mut EventCtx<'_, '_>,
        ) -> WidgetResult<()> {
            self.downs += 1;
            Ok(())
        }
        fn on_pointer_move(
            &mut self,
            _event: &PointerEvent,
            _ctx: &mut EventCtx<'_, '_>,
        ) -> WidgetResult<()> {
            self.moves += 1;
            Ok(())
        }
        fn on_pointer_up(
            &mut self,
            _event: &PointerEvent,
            _ctx: &mut EventCtx<'_, '_>,
        ) -> WidgetResult<()> {
            self.ups += 1;
            Ok(())
        }
        fn set_value_external(
            &mut self,
            _params: &[f64],
            _ctx: &mut EventCtx<'_, '_>,
        ) -> WidgetResult<()> {
            Ok(())
        }
    }

    fn down(id: u32, x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Down, x, y, 0)
    }

    fn up(id: u32, x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Up, x, y, 0)
    }

    #[test]
    fn add_assigns_rect_and_registers_key() {
        let mut panel = Panel::new(400.0, 200.0);
        let mut registry = Registry::new();
        let mut probe = Probe::boxed(kurbo::Rect::new(0.0, 0.0, 0.5, 1.0));
        probe.core.pipeline = crate::pipeline::Pipeline::new(
            0.0,
            1.0,
            true,
            crate::filter::FilterChain::new(),
            Some("/probe".to_string()),
            None,
            None,
        );
        let id = panel.add(probe, &mut registry).unwrap();

        assert_eq!(registry.lookup("/probe"), Some(id));
        let widget = panel.widget(id).unwrap();
        assert_eq!(widget.surface().rect, kurbo::Rect::new(0.0, 0.0, 200.0, 200.0));
        assert!(widget.core().placement.placed);
    }

    #[test]
    fn adding_placed_widget_fails() {
        let mut panel = Panel::new(100.0, 100.0);
        let mut registry = Registry::new();
        let id = panel
            .add(Probe::boxed(kurbo::Rect::new(0.0, 0.0, 1.0, 1.0)), &mut registry)
            .unwrap();
        let widget = panel.remove(id, &mut registry).unwrap();
        // The widget keeps its placed flag; re-adding is a construction
        // error rather than a silent re-place.
        let err = panel.add(widget, &mut registry).unwrap_err();
        assert!(matches!(err, WidgetError::AlreadyPlaced));
    }

    #[test]
    fn capture_routes_to_topmost_and_releases_on_up() {
        let mut panel = Panel::new(100.0, 100.0);
        let mut registry = Registry::new();
        let below = panel
            .add(Probe::boxed(kurbo::Rect::new(0.0, 0.0, 1.0, 1.0)), &mut registry)
            .unwrap();
        let above = panel
            .add(Probe::boxed(kurbo::Rect::new(0.0, 0.0, 1.0, 1.0)), &mut registry)
            .unwrap();

        let hit = panel.dispatch_pointer(&down(1, 50.0, 50.0), None).unwrap();
        assert_eq!(hit, Some(above));

        // Move far outside still routes to the capturing widget.
        let moved = panel
            .dispatch_pointer(
                &PointerEvent::new(1, PointerPhase::Move, 500.0, 500.0, 1),
                None,
            )
            .unwrap();
        assert_eq!(moved, Some(above));

        let released = panel.dispatch_pointer(&up(1, 500.0, 500.0), None).unwrap();
        assert_eq!(released, Some(above));

        // After release the capture is gone.
        let stray = panel.dispatch_pointer(&up(1, 50.0, 50.0), None).unwrap();
        assert_eq!(stray, None);

        // The obscured widget never saw the press.
        assert!(panel.widget(below).is_some());
    }

    #[test]
    fn unmatched_up_is_noop() {
        let mut panel = Panel::new(100.0, 100.0);
        let mut registry = Registry::new();
        panel
            .add(Probe::boxed(kurbo::Rect::new(0.0, 0.0, 1.0, 1.0)), &mut registry)
            .unwrap();
        assert_eq!(panel.dispatch_pointer(&up(9, 10.0, 10.0), None).unwrap(), None);
    }

    #[test]
    fn down_outside_all_widgets_is_noop() {
        let mut panel = Panel::new(100.0, 100.0);
        let mut registry = Registry::new();
        panel
            .add(Probe::boxed(kurbo::Rect::new(0.0, 0.0, 0.2, 0.2)), &mut registry)
            .unwrap();
        assert_eq!(
            panel.dispatch_pointer(&down(1, 90.0, 90.0), None).unwrap(),
            None
        );
    }

    #[test]
    fn remove_releases_capture_and_registry() {
        let mut panel = Panel::new(100.0, 100.0);
        let mut registry = Registry::new();
        let id = panel
            .add(Probe::boxed(kurbo::Rect::new(0.0, 0.0, 1.0, 1.0)), &mut registry)
            .unwrap();
        panel.dispatch_pointer(&down(1, 50.0, 50.0), None).unwrap();
        panel.remove(id, &mut registry).unwrap();

        // The capture died with the widget; the up is now unmatched.
        assert_eq!(panel.dispatch_pointer(&up(1, 50.0, 50.0), None).unwrap(), None);
    }
}
