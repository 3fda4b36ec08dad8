//! A bank of vertical sliders behind one surface.

use std::collections::HashSet;

use kurbo::Rect;

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::widget::{clamp_unit, EventCtx, Widget, WidgetCore, WidgetOptions};

/// A row of vertical sliders addressed by index.
///
/// Dragging across the bank updates whichever slider sits under the
/// pointer; each slider commits through its own pipeline slot.
pub struct MultiSlider {
    core: WidgetCore,
    surface: Surface,
    count: usize,
    values: Vec<f64>,
    active: HashSet<PointerId>,
}

impl MultiSlider {
    /// Create a bank of `count` sliders, all at zero.
    #[must_use]
    pub fn new(count: usize, options: WidgetOptions) -> Self {
        let style = options.style.clone();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            count,
            values: vec![0.0; count],
            active: HashSet::new(),
        }
    }

    /// Raw value of one slider.
    #[must_use]
    pub fn slider_value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Number of sliders in the bank.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the bank is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn process_position(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        if self.count == 0 {
            return Ok(());
        }
        let rect = self.surface.rect;
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = ((((event.x - rect.x0) / rect.width()) * self.count as f64).floor())
            .clamp(0.0, self.count as f64 - 1.0) as usize;
        let v = clamp_unit(1.0 - (event.y - rect.y0) / rect.height());
        self.values[index] = v;
        let changed = self
            .core
            .pipeline
            .output_at(Some(index), Value::Scalar(v), ctx.remote())?;
        if changed {
            self.draw();
        }
        Ok(())
    }
}

impl Widget for MultiSlider {
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

    #[allow(clippy::cast_precision_loss)]
    fn draw(&mut self) {
        let (w, h) = (self.surface.width(), self.surface.height());
        let fill = self.surface.style.fill.clone();
        self.surface.begin();
        self.surface.clear_background();
        let slider_w = w / self.count as f64;
        for (i, &v) in self.values.iter().enumerate() {
            let column = Rect::new(
                i as f64 * slider_w,
                (1.0 - v) * h,
                (i + 1) as f64 * slider_w,
                h,
            );
            self.surface.fill_rect(column, fill.clone());
        }
        self.surface.stroke_border();
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        self.active.insert(event.id);
        self.process_position(event, ctx)
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        if self.active.contains(&event.id) {
            self.process_position(event, ctx)?;
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, _ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        self.active.remove(&event.id);
        Ok(())
    }

    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let (Some(&index), Some(&v)) = (params.first(), params.get(1)) else {
            tracing::debug!("multislider external set needs [index, value], skipping");
            return Ok(());
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = index.max(0.0) as usize;
        if index >= self.count {
            tracing::debug!(index, "multislider external set out of range, skipping");
            return Ok(());
        }
        self.values[index] = clamp_unit(v);
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
