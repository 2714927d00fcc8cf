use std::f32::consts::PI;

use crate::{config::AudioConfig, mapping::frequency_for};

/// A short rendered tone as interleaved-ready stereo frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub sample_rate: u32,
    /// One `[left, right]` pair per sample; both channels carry the same
    /// mono signal.
    pub frames: Vec<[i16; 2]>,
}

impl Tone {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_seconds(&self) -> f32 {
        self.frames.len() as f32 / self.sample_rate as f32
    }
}

/// Renders decaying sine tones whose pitch encodes a bar value.
#[derive(Debug, Clone)]
pub struct ToneSynth {
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
    decay: f32,
}

impl ToneSynth {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            duration: config.tone_ms as f32 / 1000.0,
            amplitude: config.amplitude,
            decay: config.decay,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames in every rendered tone.
    pub fn frames_per_tone(&self) -> usize {
        (self.sample_rate as f32 * self.duration) as usize
    }

    /// Renders the tone for `value`.
    pub fn render(&self, value: f32) -> Tone {
        let frequency = frequency_for(value);
        let rate = self.sample_rate as f32;
        let frames = (0..self.frames_per_tone())
            .map(|k| {
                let t = k as f32 / rate;
                let wave = self.amplitude * (2.0 * PI * frequency * t).sin() * (-self.decay * t).exp();
                let sample = (wave.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                [sample, sample]
            })
            .collect();

        Tone {
            frequency,
            sample_rate: self.sample_rate,
            frames,
        }
    }
}
