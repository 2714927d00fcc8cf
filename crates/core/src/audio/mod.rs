use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use crossbeam_channel::{Receiver, Sender};

use crate::{Result, SortVizError, Tone};

/// Destination for synthesised tones. Playback must not block the caller.
pub trait ToneSink {
    fn play(&mut self, tone: Tone) -> Result<()>;
}

impl<T: ToneSink + ?Sized> ToneSink for Box<T> {
    fn play(&mut self, tone: Tone) -> Result<()> {
        (**self).play(tone)
    }
}

/// Sums any number of overlapping tones into a stereo stream.
#[derive(Debug, Default)]
pub struct Mixer {
    voices: Vec<Voice>,
}

#[derive(Debug)]
struct Voice {
    tone: Tone,
    cursor: usize,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `tone` at the next frame written by [`Mixer::mix`].
    pub fn add(&mut self, tone: Tone) {
        if !tone.is_empty() {
            self.voices.push(Voice { tone, cursor: 0 });
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Overwrites `out` with the mix of every active voice, clamped to the
    /// i16 range, and drops voices that have played out.
    pub fn mix(&mut self, out: &mut [[i16; 2]]) {
        for (offset, frame) in out.iter_mut().enumerate() {
            let mut left = 0i32;
            let mut right = 0i32;
            for voice in &self.voices {
                if let Some([l, r]) = voice.tone.frames.get(voice.cursor + offset) {
                    left += *l as i32;
                    right += *r as i32;
                }
            }
            *frame = [clamp_i16(left), clamp_i16(right)];
        }

        let written = out.len();
        self.voices.retain_mut(|voice| {
            voice.cursor += written;
            voice.cursor < voice.tone.len()
        });
    }
}

fn clamp_i16(sample: i32) -> i16 {
    sample.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Plays tones on the default system output device.
///
/// Tones are handed to the device callback over a channel; the callback owns
/// a [`Mixer`] so overlapping tones simply sum.
pub struct AudioOutput {
    _stream: cpal::Stream,
    sender: Sender<Tone>,
    sample_rate: u32,
}

impl AudioOutput {
    /// Opens the default output device in its default channel layout and
    /// sample format. `preferred_rate` is used when the device supports it,
    /// otherwise the device's default rate wins; check
    /// [`AudioOutput::sample_rate`] before rendering tones.
    pub fn open(preferred_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SortVizError::Audio("no default output device".to_string()))?;

        let default = device.default_output_config().map_err(SortVizError::audio)?;
        let channels = default.channels();
        let format = default.sample_format();
        let ranges: Vec<(u32, u32)> = device
            .supported_output_configs()
            .map(|configs| {
                configs
                    .filter(|c| c.channels() == channels && c.sample_format() == format)
                    .map(|c| (c.min_sample_rate().0, c.max_sample_rate().0))
                    .collect()
            })
            .unwrap_or_default();
        let sample_rate = choose_sample_rate(preferred_rate, &ranges, default.sample_rate().0);

        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (sender, receiver) = crossbeam_channel::unbounded();
        let callback = MixerCallback::new(receiver, channels as usize);

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, callback),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, callback),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, callback),
            other => Err(SortVizError::Audio(format!(
                "unsupported output sample format {other:?}"
            ))),
        }?;
        stream.play().map_err(SortVizError::audio)?;

        tracing::info!(
            device = device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            channels,
            format = ?format,
            "audio output started"
        );

        Ok(Self {
            _stream: stream,
            sender,
            sample_rate,
        })
    }

    /// Rate the device runs at, which tones must be rendered at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut callback: MixerCallback,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| callback.fill(data),
            |err| tracing::error!(%err, "audio output stream error"),
            None,
        )
        .map_err(SortVizError::audio)
}

/// `preferred` if any supported `(min, max)` range contains it, else
/// `fallback`.
fn choose_sample_rate(preferred: u32, ranges: &[(u32, u32)], fallback: u32) -> u32 {
    if ranges.iter().any(|&(min, max)| min <= preferred && preferred <= max) {
        preferred
    } else {
        fallback
    }
}

impl ToneSink for AudioOutput {
    fn play(&mut self, tone: Tone) -> Result<()> {
        self.sender
            .send(tone)
            .map_err(|_| SortVizError::Audio("audio output stream has stopped".to_string()))
    }
}

impl std::fmt::Debug for AudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput")
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

struct MixerCallback {
    receiver: Receiver<Tone>,
    mixer: Mixer,
    channels: usize,
    scratch: Vec<[i16; 2]>,
}

impl MixerCallback {
    fn new(receiver: Receiver<Tone>, channels: usize) -> Self {
        Self {
            receiver,
            mixer: Mixer::new(),
            channels: channels.max(1),
            scratch: Vec::new(),
        }
    }

    /// Mono devices get the average of both channels; channels past the
    /// second stay silent.
    fn fill<T>(&mut self, data: &mut [T])
    where
        T: Sample + FromSample<f32>,
    {
        for tone in self.receiver.try_iter() {
            self.mixer.add(tone);
        }

        let frames = data.len() / self.channels;
        self.scratch.resize(frames, [0, 0]);
        self.mixer.mix(&mut self.scratch);

        for (out, [left, right]) in data.chunks_exact_mut(self.channels).zip(&self.scratch) {
            let left = *left as f32 / 32_768.0;
            let right = *right as f32 / 32_768.0;
            match out {
                [mono] => *mono = T::from_sample((left + right) * 0.5),
                [first, second, rest @ ..] => {
                    *first = T::from_sample(left);
                    *second = T::from_sample(right);
                    for sample in rest {
                        *sample = T::EQUILIBRIUM;
                    }
                }
                [] => {}
            }
        }
    }
}

/// Discards tones. Used when sound is disabled.
#[derive(Debug, Default)]
pub struct MutedOutput {
    discarded: u64,
}

impl MutedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl ToneSink for MutedOutput {
    fn play(&mut self, tone: Tone) -> Result<()> {
        self.discarded += 1;
        tracing::trace!(frequency = tone.frequency, "tone muted");
        Ok(())
    }
}
