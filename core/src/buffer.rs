//! The double-buffered sample path between the frame producer (the
//! transport controller, running in the foreground) and the sample pump
//! (the interrupt handler driving the DAC).
//!
//! Concurrency model adapted from the atomic buffer-index handoff pattern
//! used for ISR-shared state elsewhere in this retrieval pack: two fixed
//! buffers, an atomic index naming which one the pump is currently
//! draining, and a flag the pump raises once per swap. Only scalar state
//! crosses the boundary, so plain `std::sync::atomic` types are enough —
//! no spinlock over a content region is needed.

use std::cell::UnsafeCell;
use std::hint::spin_loop;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

/// 40 kHz sample rate / 60 Hz frame rate, rounded up.
pub const SAMPLES_PER_FRAME: usize = 667;
/// Midpoint of unsigned 8-bit offset-binary PCM; the signal's zero level.
pub const SILENCE: u8 = 0x80;

pub type FrameBuffer = [u8; SAMPLES_PER_FRAME];

struct Shared {
    buffers: [UnsafeCell<FrameBuffer>; 2],
    active: AtomicU8,
    vblank: AtomicBool,
    swap_count: AtomicU32,
}

// SAFETY: `buffers[i]` is only ever read by the pump (when `i == active`) or
// written by the producer (when `i == 1 - active`). The two indices are
// always disjoint, so there is no concurrent access to the same cell
// despite the `UnsafeCell`.
unsafe impl Sync for Shared {}

/// Splits a freshly silenced double buffer into its pump and producer
/// halves, ready to be handed to a `Player` and an audio callback
/// respectively.
pub fn channel() -> (FrameProducer, Pump) {
    let shared = Arc::new(Shared {
        buffers: [
            UnsafeCell::new([SILENCE; SAMPLES_PER_FRAME]),
            UnsafeCell::new([SILENCE; SAMPLES_PER_FRAME]),
        ],
        active: AtomicU8::new(0),
        vblank: AtomicBool::new(false),
        swap_count: AtomicU32::new(0),
    });
    (
        FrameProducer {
            shared: shared.clone(),
        },
        Pump { shared, index: 0 },
    )
}

/// Foreground half: fills whichever buffer the pump isn't draining, and
/// paces itself on the pump's vblank flag.
pub struct FrameProducer {
    shared: Arc<Shared>,
}

impl FrameProducer {
    /// Runs `f` over the buffer not currently being drained by the pump.
    pub fn fill_inactive(&mut self, f: impl FnOnce(&mut FrameBuffer)) {
        let active = self.shared.active.load(Ordering::Acquire) as usize;
        let inactive = 1 - active;
        // SAFETY: the pump only reads `buffers[active]`; this is the other slot.
        let buf = unsafe { &mut *self.shared.buffers[inactive].get() };
        f(buf);
        // Re-publish the same index with a release store. `active` is
        // otherwise only ever written by the pump, so without this the
        // write to `buf` above has no happens-before edge to the pump's
        // later acquire-load of `active` and subsequent read of this same
        // buffer -- the pump could legally observe a stale or torn frame.
        // This store always wins that race harmlessly as long as the
        // producer keeps up within one frame period, which `wait_vblank`
        // already requires of it.
        self.shared.active.store(active as u8, Ordering::Release);
    }

    /// Blocks until the pump raises the vblank flag, i.e. until it has
    /// swapped onto the buffer we just wrote, giving us roughly one frame
    /// period before the next deadline.
    pub fn wait_vblank(&self) {
        while !self.shared.vblank.load(Ordering::Acquire) {
            spin_loop();
        }
    }

    /// Total buffer swaps the pump has performed so far. Monotonic modulo
    /// wraparound; used by [`crate::diagnostics`] to detect missed frames.
    pub fn swap_count(&self) -> u32 {
        self.shared.swap_count.load(Ordering::Relaxed)
    }
}

/// Interrupt-context half: emits one sample per call, never allocates,
/// never blocks, and never calls back into the foreground.
pub struct Pump {
    shared: Arc<Shared>,
    index: usize,
}

impl Pump {
    /// Emits the next sample and performs the buffer swap at frame
    /// boundaries. Intended to be called once per tick of the sample clock
    /// (40 kHz).
    pub fn next_sample(&mut self) -> u8 {
        let active = self.shared.active.load(Ordering::Acquire) as usize;
        // SAFETY: the producer only writes `buffers[1 - active]`.
        let buf = unsafe { &*self.shared.buffers[active].get() };
        let sample = buf[self.index];

        self.shared.vblank.store(false, Ordering::Relaxed);
        self.index += 1;
        if self.index == SAMPLES_PER_FRAME {
            self.index = 0;
            let next = 1 - active;
            self.shared.active.store(next as u8, Ordering::Release);
            self.shared.swap_count.fetch_add(1, Ordering::Relaxed);
            self.shared.vblank.store(true, Ordering::Release);
        }

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_silent() {
        let (_producer, mut pump) = channel();
        for _ in 0..SAMPLES_PER_FRAME {
            assert_eq!(pump.next_sample(), SILENCE);
        }
    }

    #[test]
    fn exactly_one_frame_between_swaps() {
        let (mut producer, mut pump) = channel();
        producer.fill_inactive(|buf| buf.fill(0x11));

        let mut swaps = 0;
        for _ in 0..SAMPLES_PER_FRAME * 3 {
            pump.next_sample();
            if pump.shared.vblank.load(Ordering::Relaxed) {
                swaps += 1;
            }
        }
        assert_eq!(swaps, 3);
    }

    #[test]
    fn producer_never_sees_the_buffer_the_pump_is_draining() {
        let (mut producer, mut pump) = channel();
        producer.fill_inactive(|buf| buf.fill(0xAA));

        // Drain exactly one frame so the pump swaps onto the 0xAA buffer.
        for _ in 0..SAMPLES_PER_FRAME {
            assert_eq!(pump.next_sample(), SILENCE);
        }
        producer.wait_vblank();

        // The producer's inactive buffer is now the one the pump just left,
        // still holding silence; writing to it must not affect what the
        // pump is currently emitting (0xAA).
        producer.fill_inactive(|buf| buf.fill(0xBB));
        for _ in 0..SAMPLES_PER_FRAME {
            assert_eq!(pump.next_sample(), 0xAA);
        }
    }

    #[test]
    fn swap_count_matches_frames_drained() {
        let (_producer, mut pump) = channel();
        for _ in 0..SAMPLES_PER_FRAME * 5 {
            pump.next_sample();
        }
        assert_eq!(pump.shared.swap_count.load(Ordering::Relaxed), 5);
    }
}
