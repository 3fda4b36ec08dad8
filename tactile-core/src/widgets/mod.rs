//! Concrete widget types.
//!
//! Every widget here follows the same event discipline: mutate the raw
//! value, run the output pipeline, redraw when the pipeline reports a
//! change (plus the documented forced redraws, like the joystick's
//! snap-back).

mod button;
mod grid;
mod joystick;
mod keyboard;
mod knob;
mod multislider;
mod slider;
mod xy;

pub use button::{Button, ButtonMode, MOMENTARY_RESET_MS};
pub use grid::ButtonGrid;
pub use joystick::Joystick;
pub use keyboard::{point_in_polygon, Keyboard};
pub use knob::{Knob, KnobMapping};
pub use multislider::MultiSlider;
pub use slider::{Orientation, Slider};
pub use xy::Xy;
