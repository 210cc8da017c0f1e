//! Frame-aligned decoder for the song byte stream.
//!
//! Song format: a stream of `delta:u8, command:u8, operands...` events.
//! `command`'s high nibble selects the operation, the low nibble selects
//! the target channel (0=pulse A, 1=pulse B, 2=triangle, 3=noise); see the
//! command table in the crate's design notes.

use crate::cursor::{byte_at, FrameClock, SongCursor};
use crate::synth::Synth;

/// Consumes every event scheduled for the current frame, mutating `synth`
/// and advancing `cursor` in place. Stops at the first event whose
/// accumulated delta places it in a future frame.
///
/// Bounded by `song.len()` iterations: a well-authored song never comes
/// close to that many same-frame events, but a malformed one (e.g. a
/// `0xF0` jump landing back on a zero-delta event, forming a cycle that
/// never advances the frame counter within a single call) otherwise spins
/// forever, which would violate the "completes in well under one frame
/// period" real-time budget.
pub fn run_frame(song: &[u8], cursor: &mut SongCursor, clock: &mut FrameClock, synth: &mut Synth) {
    let budget = song.len().max(1);
    for _ in 0..budget {
        let delta = byte_at(song, cursor.pos) as u16;
        if clock.last_event_frame.wrapping_add(delta) != clock.frame {
            break;
        }
        cursor.pos += 1;
        let command = byte_at(song, cursor.pos);
        cursor.pos += 1;

        let channel = (command & 0x0F) as usize;
        match command & 0xF0 {
            0x00 => {
                let lo = byte_at(song, cursor.pos) as u16;
                let hi = byte_at(song, cursor.pos + 1) as u16;
                cursor.pos += 2;
                #[cfg(feature = "sequencer-logging")]
                log::trace!("frame {}: ch{} step <- {:#06x}", clock.frame, channel, lo | (hi << 8));
                synth.set_step(channel, lo | (hi << 8));
            }
            0x10 => {
                let value = byte_at(song, cursor.pos) as i8;
                cursor.pos += 1;
                #[cfg(feature = "sequencer-logging")]
                log::trace!("frame {}: ch{} volume <- {}", clock.frame, channel, value);
                synth.set_volume(channel, value);
            }
            0x30 => {
                let value = byte_at(song, cursor.pos);
                cursor.pos += 1;
                #[cfg(feature = "sequencer-logging")]
                log::trace!("frame {}: ch{} duty <- {:#04x}", clock.frame, channel, value);
                synth.set_duty(channel, value);
            }
            0x40 => {
                let value = byte_at(song, cursor.pos);
                cursor.pos += 1;
                #[cfg(feature = "sequencer-logging")]
                log::trace!("frame {}: noise mode <- {}", clock.frame, value != 0);
                synth.set_noise_mode(value != 0);
            }
            0xE0 => {
                #[cfg(feature = "sequencer-logging")]
                log::debug!("frame {}: repeat point marked at {}", clock.frame, cursor.pos);
                cursor.repeat = cursor.pos;
            }
            0xF0 => {
                #[cfg(feature = "sequencer-logging")]
                log::debug!("frame {}: jump to repeat point {}", clock.frame, cursor.repeat);
                cursor.pos = cursor.repeat;
            }
            _ => {}
        }

        clock.last_event_frame = clock.frame;
    }
}
