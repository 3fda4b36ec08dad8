//! A multi-point XY pad with per-frame physics.

use std::collections::HashMap;

use kurbo::{Point, Vec2};

use crate::error::WidgetResult;
use crate::event::{PointerEvent, PointerId};
use crate::pipeline::Value;
use crate::surface::Surface;
use crate::widget::{clamp_unit, EventCtx, Widget, WidgetCore, WidgetOptions};

/// Velocity below which a free point is considered at rest.
const REST_SPEED: f64 = 1e-6;

/// One tracked point on the pad.
#[derive(Debug, Clone, Copy)]
struct PadPoint {
    /// Position, unit-normalized per axis.
    pos: Point,
    /// Velocity in normalized units per frame.
    vel: Vec2,
    /// Whether a pointer currently holds this point.
    held: bool,
}

/// An XY pad tracking a fixed set of points.
///
/// A press never spawns a point: it claims the nearest existing one (by
/// Manhattan distance) and drags it. Released points keep their drag
/// velocity and drift under the per-frame physics step, reflecting off
/// the pad edges at their bounding radius. The host drives the step once
/// per animation frame through
/// [`Panel::step_animation`](crate::Panel::step_animation).
pub struct Xy {
    core: WidgetCore,
    surface: Surface,
    points: Vec<PadPoint>,
    /// Claimed point per active pointer.
    sessions: HashMap<PointerId, usize>,
    friction: f64,
    /// Point radius in pixels.
    radius: f64,
}

impl Xy {
    /// Create a pad with `count` points spread across the middle row.
    #[must_use]
    pub fn new(count: usize, options: WidgetOptions) -> Self {
        let style = options.style.clone();
        #[allow(clippy::cast_precision_loss)]
        let points = (0..count)
            .map(|i| PadPoint {
                pos: Point::new((i as f64 + 1.0) / (count as f64 + 1.0), 0.5),
                vel: Vec2::ZERO,
                held: false,
            })
            .collect();
        Self {
            core: WidgetCore::new(options),
            surface: Surface::new(style),
            points,
            sessions: HashMap::new(),
            friction: 1.05,
            radius: 10.0,
        }
    }

    /// Number of tracked points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the pad tracks no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position of one point, unit-normalized.
    #[must_use]
    pub fn point_value(&self, index: usize) -> Option<[f64; 2]> {
        self.points.get(index).map(|p| [p.pos.x, p.pos.y])
    }

    /// Set the per-frame friction divisor (velocity is scaled by its
    /// inverse each step).
    pub fn set_friction(&mut self, friction: f64) {
        self.friction = friction;
    }

    /// Set the point bounding radius in pixels.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    fn normalized(&self, event: &PointerEvent) -> Point {
        let rect = self.surface.rect;
        Point::new(
            clamp_unit((event.x - rect.x0) / rect.width()),
            clamp_unit((event.y - rect.y0) / rect.height()),
        )
    }

    /// The existing point closest to `pos` by Manhattan distance.
    fn nearest_point(&self, pos: Point) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p.pos.x - pos.x).abs() + (p.pos.y - pos.y).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn emit(&mut self, index: usize, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<bool> {
        let p = self.points[index];
        self.core
            .pipeline
            .output_at(Some(index), Value::Pair([p.pos.x, p.pos.y]), ctx.remote())
            .map_err(Into::into)
    }
}

impl Widget for Xy {
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
        let radius = self.radius;
        self.surface.begin();
        self.surface.clear_background();
        let centers: Vec<Point> = self
            .points
            .iter()
            .map(|p| Point::new(p.pos.x * w, p.pos.y * h))
            .collect();
        for center in centers {
            self.surface.fill_circle(center, radius, fill.clone());
        }
        self.surface.stroke_border();
    }

    fn wants_animation(&self) -> bool {
        true
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let pos = self.normalized(event);
        // Claim the nearest existing point instead of spawning one.
        let Some(index) = self.nearest_point(pos) else {
            return Ok(());
        };
        self.points[index].pos = pos;
        self.points[index].vel = Vec2::ZERO;
        self.points[index].held = true;
        self.sessions.insert(event.id, index);
        if self.emit(index, ctx)? {
            self.draw();
        }
        Ok(())
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let Some(&index) = self.sessions.get(&event.id) else {
            return Ok(());
        };
        let pos = self.normalized(event);
        // Drag velocity carries over when the point is released.
        self.points[index].vel = pos - self.points[index].pos;
        self.points[index].pos = pos;
        if self.emit(index, ctx)? {
            self.draw();
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, _ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        if let Some(index) = self.sessions.remove(&event.id) {
            self.points[index].held = false;
        }
        Ok(())
    }

    fn step(&mut self, ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let rect = self.surface.rect;
        let rx = if rect.width() > 0.0 {
            self.radius / rect.width()
        } else {
            0.0
        };
        let ry = if rect.height() > 0.0 {
            self.radius / rect.height()
        } else {
            0.0
        };

        let mut any_changed = false;
        for index in 0..self.points.len() {
            let point = &mut self.points[index];
            if point.held || point.vel.hypot() < REST_SPEED {
                continue;
            }
            // Inverse-friction-scaled velocity advances the position;
            // crossing an edge at the bounding radius reflects it.
            point.vel *= 1.0 / self.friction;
            point.pos += point.vel;
            if point.pos.x < rx {
                point.pos.x = rx;
                point.vel.x = -point.vel.x;
            } else if point.pos.x > 1.0 - rx {
                point.pos.x = 1.0 - rx;
                point.vel.x = -point.vel.x;
            }
            if point.pos.y < ry {
                point.pos.y = ry;
                point.vel.y = -point.vel.y;
            } else if point.pos.y > 1.0 - ry {
                point.pos.y = 1.0 - ry;
                point.vel.y = -point.vel.y;
            }
            if self.emit(index, ctx)? {
                any_changed = true;
            }
        }
        if any_changed {
            self.draw();
        }
        Ok(())
    }

    fn set_value_external(&mut self, params: &[f64], ctx: &mut EventCtx<'_, '_>) -> WidgetResult<()> {
        let (Some(&index), Some(&x), Some(&y)) = (params.first(), params.get(1), params.get(2))
        else {
            tracing::debug!("xy external set needs [index, x, y], skipping");
            return Ok(());
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = index.max(0.0) as usize;
        if index >= self.points.len() {
            tracing::debug!(index, "xy external set out of range, skipping");
            return Ok(());
        }
        self.points[index].pos = Point::new(clamp_unit(x), clamp_unit(y));
        self.points[index].vel = Vec2::ZERO;
        if self.emit(index, ctx)? {
            self.draw();
        }
        Ok(())
    }
}
