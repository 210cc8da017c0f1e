//! Four-voice fixed-point synthesizer and byte-coded song sequencer for a
//! 2A03-style chiptune player.
//!
//! The crate is split the way the hardware is: [`buffer`] models the
//! interrupt-driven sample pump and the double buffer it shares with the
//! foreground, [`synth`] is the per-sample wave generator, [`sequencer`]
//! decodes the song byte stream into voice-state writes, and [`player`]
//! ties the three together behind the small transport surface (`load`,
//! `play`, `pause`, `stop`, `process_frame`, `wait_vblank`) that the outer
//! shell (LCD, gamepad, song library) drives.

pub mod buffer;
pub mod cursor;
#[cfg(feature = "deadline-diagnostics")]
pub mod diagnostics;
pub mod player;
pub mod sequencer;
pub mod state;
pub mod synth;

pub use buffer::{channel, FrameBuffer, FrameProducer, Pump, SAMPLES_PER_FRAME, SILENCE};
pub use player::Player;
pub use state::PlayState;
pub use synth::Synth;
