//! Feeds a [`chiptune_core::Pump`] into a cpal output stream, standing in
//! for the source's hardware PWM timer interrupt (there, an ISR reading the
//! next byte out of the active frame buffer and loading it into the PWM
//! compare register at a fixed 40kHz; here, cpal's own callback thread
//! calling into this module at whatever rate the device actually runs).
//!
//! The pump itself is lock-free (single atomic word, see
//! [`chiptune_core::buffer`]), so unlike a typical ring-buffer bridge this
//! needs no mutex between the callback and the rest of the program -- the
//! `Stream` handle just has to stay alive for as long as audio should play.
//!
//! `chiptune_core`'s frame budget (`SAMPLES_PER_FRAME`) and every voice's
//! `step` value are tuned assuming the pump is ticked exactly 40 000 times a
//! second; almost no consumer audio device exposes a 40kHz output mode
//! (44.1kHz and 48kHz dominate), so driving `pump.next_sample()` once per
//! device sample -- as if the device were already at 40kHz -- would make
//! every voice play 10-20% sharp and shrink each logical frame below its
//! intended 1/60s. [`negotiate_config`] first tries to get the device to run
//! at exactly 40kHz directly; when the device can't, [`Resampler`] keeps the
//! pump on its own virtual 40kHz clock and linearly interpolates that stream
//! onto the device's actual rate, the way `sandlbn-Phosphor`'s SID output
//! keeps the chip's sample clock decoupled from the sound card's.

use anyhow::{Context, Result};
use chiptune_core::Pump;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleRate;

/// The rate `chiptune_core`'s frame budget and voice steps are tuned for.
const CORE_SAMPLE_RATE: u32 = 40_000;

pub struct AudioOutput {
    _stream: cpal::Stream,
}

impl AudioOutput {
    pub fn start(pump: Pump) -> Result<AudioOutput> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no audio output device available")?;

        let (stream_config, device_rate) = negotiate_config(&device)?;
        if device_rate == CORE_SAMPLE_RATE {
            log::info!("audio device supports the core's native {}Hz directly", CORE_SAMPLE_RATE);
        } else {
            log::info!(
                "audio device runs at {}Hz; resampling from the core's native {}Hz",
                device_rate,
                CORE_SAMPLE_RATE
            );
        }

        let channels = stream_config.channels as usize;
        let mut resampler = Resampler::new(pump, device_rate);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let sample = resampler.next_sample();
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| log::error!("audio stream error: {}", err),
            )
            .context("failed to build output stream")?;

        stream.play().context("failed to start output stream")?;

        Ok(AudioOutput { _stream: stream })
    }
}

/// Picks a concrete stream config, preferring one whose sample-rate range
/// actually covers the core's native 40kHz so no resampling is needed at
/// all; falls back to the device's default config (at whatever rate that
/// is) otherwise, leaving the resampling to [`Resampler`].
fn negotiate_config(device: &cpal::Device) -> Result<(cpal::StreamConfig, u32)> {
    let native_rate_config = device
        .supported_output_configs()
        .context("failed to query supported output configs")?
        .find(|range| range.min_sample_rate().0 <= CORE_SAMPLE_RATE && CORE_SAMPLE_RATE <= range.max_sample_rate().0)
        .map(|range| range.with_sample_rate(SampleRate(CORE_SAMPLE_RATE)));

    let config = match native_rate_config {
        Some(config) => config,
        None => device.default_output_config().context("no default output config")?,
    };

    let rate = config.sample_rate().0;
    Ok((config.into(), rate))
}

/// Bridges the core's fixed 40kHz virtual sample clock to whatever rate the
/// output device actually runs at, by linear interpolation between the two
/// most recently pumped samples. Driven once per device sample; internally
/// advances the pump by however many virtual 40kHz samples that represents.
struct Resampler {
    pump: Pump,
    /// Virtual (40kHz) samples elapsed per device sample.
    step: f64,
    /// Fractional position between `prev` and `next`, in `[0, 1)`.
    phase: f64,
    prev: f32,
    next: f32,
}

impl Resampler {
    fn new(mut pump: Pump, device_rate: u32) -> Self {
        let prev = to_signal(pump.next_sample());
        let next = to_signal(pump.next_sample());
        Resampler {
            pump,
            step: CORE_SAMPLE_RATE as f64 / device_rate as f64,
            phase: 0.0,
            prev,
            next,
        }
    }

    fn next_sample(&mut self) -> f32 {
        let out = self.prev + (self.next - self.prev) * self.phase as f32;
        self.phase += self.step;
        while self.phase >= 1.0 {
            self.phase -= 1.0;
            self.prev = self.next;
            self.next = to_signal(self.pump.next_sample());
        }
        out
    }
}

/// Unsigned 8-bit PCM, midpoint 0x80, to a centered `[-1.0, 1.0]` float --
/// same convention the source's PWM duty cycle used.
fn to_signal(sample: u8) -> f32 {
    (sample as f32 - 128.0) / 128.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chiptune_core::channel;

    #[test]
    fn native_rate_is_an_exact_passthrough() {
        const FILL: u8 = 0xA0;
        let (mut reference_producer, mut reference_pump) = channel();
        reference_producer.fill_inactive(|buf| buf.fill(FILL));
        let (mut producer, pump) = channel();
        producer.fill_inactive(|buf| buf.fill(FILL));

        let mut resampler = Resampler::new(pump, CORE_SAMPLE_RATE);

        for _ in 0..chiptune_core::SAMPLES_PER_FRAME * 2 {
            let expected = to_signal(reference_pump.next_sample());
            assert_eq!(resampler.next_sample(), expected);
        }
    }

    #[test]
    fn interpolates_linearly_between_consecutive_virtual_samples() {
        let (_producer, pump) = channel();
        let mut resampler = Resampler {
            pump,
            step: 0.25,
            phase: 0.0,
            prev: 0.0,
            next: 1.0,
        };

        assert_eq!(resampler.next_sample(), 0.0);
        assert_eq!(resampler.next_sample(), 0.25);
        assert_eq!(resampler.next_sample(), 0.5);
        assert_eq!(resampler.next_sample(), 0.75);
    }
}
