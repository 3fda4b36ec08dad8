//! A rows-by-columns bank of buttons behind one surface.

use std::collections::HashMap;

use kurbo::Rect;

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::timer::{TimerHandle, TimerTask};
use crate::widget::{EventCtx, Widget, WidgetCore, WidgetOptions};

use super::button::{ButtonMode, MOMENTARY_RESET_MS};

/// A grid of buttons sharing one mode, addressed by cell index
/// (`row * columns + column`).
///
/// Each pointer tracks the cell it currently engages; dragging across
/// the grid hands the engagement to the cell under the pointer without
/// requiring a fresh press (hold and toggle styles only).
pub struct ButtonGrid {
    core: WidgetCore,
    surface: Surface,
    rows: usize,
    columns: usize,
    mode: ButtonMode,
    values: Vec<f64>,
    /// Engaged cell per active pointer.
    sessions: HashMap<PointerId, usize>,
    /// Pending momentary resets per cell.
    pending_resets: HashMap<usize, TimerHandle>,
}

impl ButtonGrid {
    /// Create a grid with `rows * columns` cells, all off.
    #[must_use]
    pub fn new(rows: usize, columns: usize, mode: ButtonMode, options: WidgetOptions) -> Self {
        let style = options.style.clone();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            rows,
            columns,
            mode,
            values: vec![0.0; rows * columns],
            sessions: HashMap::new(),
            pending_resets: HashMap::new(),
        }
    }

    /// Raw value of one cell.
    #[must_use]
    pub fn cell_value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// The cell index under an absolute position, if inside the rect.
    #[must_use]
    pub fn cell_at(&self, x: f64, y: f64) -> Option<usize> {
        let rect = self.surface.rect;
        if self.values.is_empty() || !rect.contains(kurbo::Point::new(x, y)) {
            return None;
        }
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let column = (((x - rect.x0) / rect.width()) * self.columns as f64)
            .floor()
            .min(self.columns as f64 - 1.0) as usize;
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let row = (((y - rect.y0) / rect.height()) * self.rows as f64)
            .floor()
            .min(self.rows as f64 - 1.0) as usize;
        Some(row * self.columns + column)
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

    fn engage(&mut self, index: usize, now_ms: u64, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        match self.mode {
            ButtonMode::Toggle | ButtonMode::Hold => {
                self.values[index] = 1.0;
                self.emit(index, ctx)?;
            }
            ButtonMode::Momentary => {
                self.values[index] = 1.0;
                self.emit(index, ctx)?;
                if let Some(handle) = self.pending_resets.remove(&index) {
                    ctx.timers.cancel(handle);
                }
                let handle = ctx.timers.schedule(
                    now_ms + MOMENTARY_RESET_MS,
                    TimerTask::MomentaryReset {
                        widget: self.core.id,
                        index,
                    },
                );
                self.pending_resets.insert(index, handle);
            }
        }
        Ok(())
    }

    fn disengage(&mut self, index: usize, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        self.values[index] = 0.0;
        self.emit(index, ctx)
    }
}

impl Widget for ButtonGrid {
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
        let stroke = self.surface.style.stroke.clone();
        self.surface.begin();
        self.surface.clear_background();
        let cell_w = w / self.columns as f64;
        let cell_h = h / self.rows as f64;
        for row in 0..self.rows {
            for column in 0..self.columns {
                let index = row * self.columns + column;
                let cell = Rect::new(
                    column as f64 * cell_w,
                    row as f64 * cell_h,
                    (column + 1) as f64 * cell_w,
                    (row + 1) as f64 * cell_h,
                );
                if self.values[index] >= 0.5 {
                    self.surface.fill_rect(cell, fill.clone());
                }
                self.surface.stroke_rect(cell, stroke.clone());
            }
        }
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let Some(index) = self.cell_at(event.x, event.y) else {
            return Ok(());
        };
        if self.mode == ButtonMode::Toggle {
            // A toggle press flips the addressed cell.
            self.values[index] = if self.values[index] >= 0.5 { 0.0 } else { 1.0 };
            self.emit(index, ctx)?;
        } else {
            self.engage(index, event.timestamp_ms, ctx)?;
        }
        self.sessions.insert(event.id, index);
        Ok(())
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let Some(&engaged) = self.sessions.get(&event.id) else {
            return Ok(());
        };
        let Some(index) = self.cell_at(event.x, event.y) else {
            return Ok(());
        };
        if index == engaged || self.mode == ButtonMode::Momentary {
            return Ok(());
        }
        // Hand the engagement to the cell now under the pointer.
        self.disengage(engaged, ctx)?;
        self.engage(index, event.timestamp_ms, ctx)?;
        self.sessions.insert(event.id, index);
        Ok(())
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let Some(engaged) = self.sessions.remove(&event.id) else {
            return Ok(());
        };
        if self.mode == ButtonMode::Hold {
            self.disengage(engaged, ctx)?;
        }
        Ok(())
    }

    fn on_timer(&mut self, task: TimerTask, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let TimerTask::MomentaryReset { index, .. } = task;
        if index < self.values.len() {
            self.pending_resets.remove(&index);
            self.values[index] = 0.0;
            self.emit(index, ctx)?;
        }
        Ok(())
    }

    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let (Some(&index), Some(&v)) = (params.first(), params.get(1)) else {
            tracing::debug!("grid external set needs [index, value], skipping");
            return Ok(());
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = index.max(0.0) as usize;
        if index >= self.values.len() {
            tracing::debug!(index, "grid external set out of range, skipping");
            return Ok(());
        }
        self.values[index] = if v >= 0.5 { 1.0 } else { 0.0 };
        self.emit(index, ctx)
    }
}
