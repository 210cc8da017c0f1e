//! The platform layer: the one piece of the outer shell that actually
//! touches real-time audio hardware, standing in for the original's PWM
//! timer interrupt and DAC pin.

mod cpal_output;

pub use cpal_output::AudioOutput;
