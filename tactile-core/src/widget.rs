//! Widget identity, composition state and the widget trait.
//!
//! The toolkit composes widgets instead of layering prototypes: a
//! concrete widget struct holds a [`WidgetCore`] (identity plus the
//! output pipeline) and a [`Surface`] by value, and implements [`Widget`]
//! for the behavior that differs. Optional capabilities (timers,
//! animation, placement hooks) are trait methods with default no-op
//! bodies, resolved at compile time.
//!
//! Construction merges configuration in a fixed order: the base defaults
//! of [`WidgetOptions::default`], then the widget type's own defaults,
//! then the user's overrides via struct-update syntax.

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WidgetResult;
use crate::event::PointerEvent;
use crate::filter::{Filter, FilterChain};
use crate::pipeline::{ChangeCallback, Pipeline, RemoteSender, Target};
use crate::surface::{Style, Surface};
use crate::timer::{TimerQueue, TimerTask};

/// Unique identifier for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(Uuid);

impl WidgetId {
    /// Create a new unique widget ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a widget sits inside its panel.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    /// Fractional bounds within the panel, each axis 0..1.
    pub bounds: Rect,
    /// Whether the widget has been attached to a panel.
    pub placed: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            placed: false,
        }
    }
}

impl Placement {
    /// Resolve the fractional bounds against a panel size into an
    /// absolute rect.
    #[must_use]
    pub fn resolve(&self, panel_width: f64, panel_height: f64) -> Rect {
        Rect::new(
            self.bounds.x0 * panel_width,
            self.bounds.y0 * panel_height,
            self.bounds.x1 * panel_width,
            self.bounds.y1 * panel_height,
        )
    }
}

/// Shared construction options applied to every widget kind.
///
/// Build with struct-update syntax over the widget type's defaults:
///
/// ```
/// use tactile_core::WidgetOptions;
///
/// let opts = WidgetOptions {
///     min: 0.0,
///     max: 100.0,
///     key: Some("/fader".to_string()),
///     ..WidgetOptions::default()
/// };
/// ```
pub struct WidgetOptions {
    /// Lower output bound.
    pub min: f64,
    /// Upper output bound.
    pub max: f64,
    /// Install the automatic range pre-filter when the bounds differ
    /// from 0..1.
    pub scale_output: bool,
    /// The key/OSC address values are published under.
    pub key: Option<String>,
    /// Transmission destination.
    pub target: Option<Target>,
    /// Observer invoked once per distinct committed value.
    pub on_change: Option<ChangeCallback>,
    /// User-stage filters, run between the pre and post stages.
    pub filters: Vec<Filter>,
    /// Fractional placement bounds within the panel.
    pub bounds: Rect,
    /// Visual style.
    pub style: Style,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            scale_output: true,
            key: None,
            target: None,
            on_change: None,
            filters: Vec::new(),
            bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            style: Style::default(),
        }
    }
}

/// Identity and pipeline state shared by every widget kind.
pub struct WidgetCore {
    /// Unique widget identifier.
    pub id: WidgetId,
    /// The value-output pipeline.
    pub pipeline: Pipeline,
    /// Placement within the panel.
    pub placement: Placement,
}

impl std::fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetCore")
            .field("id", &self.id)
            .field("pipeline", &self.pipeline)
            .field("placement", &self.placement)
            .finish()
    }
}

impl WidgetCore {
    /// Assemble core state from merged options.
    #[must_use]
    pub fn new(options: WidgetOptions) -> Self {
        let mut chain = FilterChain::new();
        for filter in options.filters {
            chain.push_user(filter);
        }
        let pipeline = Pipeline::new(
            options.min,
            options.max,
            options.scale_output,
            chain,
            options.key,
            options.target,
            options.on_change,
        );
        Self {
            id: WidgetId::new(),
            pipeline,
            placement: Placement {
                bounds: options.bounds,
                placed: false,
            },
        }
    }

    /// The key/address this widget publishes under.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.pipeline.key()
    }
}

/// Per-dispatch context handed to widget event hooks.
pub struct EventCtx<'a, 'r> {
    /// Remote sender for widgets with a [`Target::Remote`], when a
    /// transport is attached.
    pub remote: Option<&'a mut (dyn RemoteSender + 'r)>,
    /// The panel's timer queue.
    pub timers: &'a mut TimerQueue,
}

impl<'a, 'r> EventCtx<'a, 'r> {
    /// Reborrow the remote sender for one pipeline call.
    pub fn remote(&mut self) -> Option<&mut (dyn RemoteSender + 'r)> {
        self.remote.as_deref_mut()
    }
}

/// The widget behavior contract.
///
/// Pointer hooks default to no-ops; a widget only implements the phases
/// its interaction style needs (a toggle button never looks at
/// pointer-up). Within one event the required ordering is: mutate the
/// raw value, run the pipeline, redraw only when the pipeline reported a
/// change (unless the widget's style documents a forced redraw).
pub trait Widget {
    /// Shared identity and pipeline state.
    fn core(&self) -> &WidgetCore;

    /// Mutable access to shared state.
    fn core_mut(&mut self) -> &mut WidgetCore;

    /// The drawing surface.
    fn surface(&self) -> &Surface;

    /// Mutable access to the drawing surface.
    fn surface_mut(&mut self) -> &mut Surface;

    /// Record this widget's display list from its current raw value.
    fn draw(&mut self);

    /// Pointer pressed inside this widget's rect (or re-pressed while
    /// already captured).
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the output pipeline.
    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let _ = (event, ctx);
        Ok(())
    }

    /// Pointer moved while captured by this widget.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the output pipeline.
    fn on_pointer_move(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let _ = (event, ctx);
        Ok(())
    }

    /// Pointer released while captured by this widget.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the output pipeline.
    fn on_pointer_up(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let _ = (event, ctx);
        Ok(())
    }

    /// A deferred task scheduled by this widget came due.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the output pipeline.
    fn on_timer(&mut self, task: TimerTask, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let _ = (task, ctx);
        Ok(())
    }

    /// Whether [`Widget::step`] should run every animation frame.
    fn wants_animation(&self) -> bool {
        false
    }

    /// Advance one animation frame, independent of pointer activity.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the output pipeline.
    fn step(&mut self, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once when the widget's rect has been assigned, before the
    /// initial draw. Widgets with placement-derived geometry (keyboards)
    /// precompute it here.
    fn on_place(&mut self) {}

    /// Externally supplied value (inbound remote message routed by key).
    ///
    /// Components are raw-domain (0..1) and are clamped before running
    /// the normal output-and-redraw path.
    ///
    /// # Errors
    ///
    /// Propagates transmission failures from the output pipeline.
    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()>;
}

/// Clamp one raw component to the unit range.
#[must_use]
pub fn clamp_unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_resolves_fractional_bounds() {
        let placement = Placement {
            bounds: Rect::new(0.25, 0.5, 0.75, 1.0),
            placed: false,
        };
        let rect = placement.resolve(400.0, 200.0);
        assert_eq!(rect, Rect::new(100.0, 100.0, 300.0, 200.0));
    }

    #[test]
    fn options_merge_keeps_unset_defaults() {
        let opts = WidgetOptions {
            min: -1.0,
            max: 1.0,
            ..WidgetOptions::default()
        };
        assert!(opts.scale_output);
        assert!(opts.key.is_none());
        assert_eq!(opts.bounds, Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn clamp_unit_bounds() {
        assert!((clamp_unit(-0.5)).abs() < f64::EPSILON);
        assert!((clamp_unit(1.5) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_unit(0.3) - 0.3).abs() < f64::EPSILON);
    }
}
