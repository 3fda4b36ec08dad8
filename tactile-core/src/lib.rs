//! # Tactile Core
//!
//! Pointer-driven control-surface widgets: sliders, knobs, buttons,
//! joysticks, XY pads and keyboards that render into per-widget drawing
//! surfaces and emit scalar/vector values through a filtered output
//! pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                tactile-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Panel           │  Widgets                 │
//! │  - Placement     │  - Interaction sessions  │
//! │  - Hit testing   │  - Raw value mutation    │
//! │  - Capture       │  - Draw command lists    │
//! ├─────────────────────────────────────────────┤
//! │  Pipeline        │  Scheduling              │
//! │  - Filter chain  │  - Timer queue           │
//! │  - Change detect │  - Animation stepping    │
//! │  - Transmission  │  - Cancellable handles   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Data flows in one direction: a pointer event reaches the [`Panel`],
//! which routes it to the captured or hit widget; the widget's interaction
//! state machine mutates its raw (unit-normalized) value and runs the
//! output pipeline; the pipeline filters the value, transmits it to the
//! configured target, and reports whether the committed value changed so
//! the widget can redraw.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod event;
pub mod filter;
pub mod panel;
pub mod pipeline;
pub mod registry;
pub mod surface;
pub mod timer;
pub mod widget;
pub mod widgets;

pub use error::{WidgetError, WidgetResult};
pub use event::{PointerEvent, PointerId, PointerPhase};
pub use filter::{scale, Filter, FilterChain};
pub use panel::Panel;
pub use pipeline::{
    ChangeCallback, ChangeEvent, LocalTarget, Pipeline, RemoteSender, SharedLocalTarget, Slot,
    Target, TransmitError, Value,
};
pub use registry::Registry;
pub use surface::{DrawCommand, Style, Surface};
pub use timer::{TimerHandle, TimerQueue, TimerTask};
pub use widget::{EventCtx, Placement, Widget, WidgetCore, WidgetId, WidgetOptions};

/// Toolkit version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
