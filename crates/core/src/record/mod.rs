use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    audio::Mixer,
    bars::BarCollection,
    config::AppConfig,
    sort::{BubbleSorter, Step},
    tone::ToneSynth,
    Result, SortVizError,
};

/// What an offline export produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub frames: u64,
    pub swaps: u64,
    pub samples: u64,
    pub duration_seconds: f32,
}

/// Renders the audio a live run would produce and writes it as a 16-bit
/// stereo WAV file.
///
/// The sorter advances once per frame at the configured frame rate, and each
/// swap tone starts at its frame's timestamp. Overlapping tones are mixed.
pub fn export_sort_audio(
    config: &AppConfig,
    mut bars: BarCollection,
    output: &Path,
) -> Result<ExportSummary> {
    config.validate()?;
    if config.display.fps == 0 {
        return Err(SortVizError::InvalidInput(
            "export requires a non-zero frame rate",
        ));
    }

    let synth = ToneSynth::new(&config.audio);
    let sample_rate = synth.sample_rate();
    let fps = config.display.fps as u64;
    let mut sorter = BubbleSorter::new(bars.len(), config.sort.pacing);
    let mut mixer = Mixer::new();

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(output, spec)?;
    let mut buffer = Vec::new();
    let mut written: u64 = 0;
    let mut frames: u64 = 0;

    loop {
        let step = sorter.step(&mut bars);
        frames += 1;
        if let Step::Swapped { value, .. } = step {
            mixer.add(synth.render(value));
        }

        // Sample boundary of the next frame, computed from the frame count so
        // rounding never drifts.
        let frame_end = frames * sample_rate as u64 / fps;
        let length = if step == Step::Finished {
            synth.frames_per_tone()
        } else {
            (frame_end - written) as usize
        };

        buffer.resize(length, [0i16; 2]);
        mixer.mix(&mut buffer);
        for [left, right] in &buffer {
            writer.write_sample(*left)?;
            writer.write_sample(*right)?;
        }
        written += length as u64;

        if step == Step::Finished {
            break;
        }
    }

    writer.finalize()?;

    let stats = sorter.stats();
    let summary = ExportSummary {
        frames,
        swaps: stats.swaps,
        samples: written,
        duration_seconds: written as f32 / sample_rate as f32,
    };
    tracing::info!(
        path = %output.display(),
        frames = summary.frames,
        swaps = summary.swaps,
        seconds = summary.duration_seconds,
        "exported sort audio"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.sort.bar_count = 4;
        config.display.fps = 100;
        config
    }

    #[test]
    fn writes_stereo_sixteen_bit_track() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sort.wav");
        let bars = BarCollection::from_values(vec![0.75, 0.0, 0.5, 0.25]);

        let summary = export_sort_audio(&small_config(), bars, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.duration() as u64, summary.samples);

        // One frame per suspension plus the finishing frame, then the tail of
        // the last tone.
        assert_eq!(summary.frames, 6 + summary.swaps + 1);
        let expected = (summary.frames - 1) * 441 + 3087;
        assert_eq!(summary.samples, expected);
    }

    #[test]
    fn tones_land_on_their_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swap.wav");
        let bars = BarCollection::from_values(vec![0.5, 0.0]);

        export_sort_audio(&small_config(), bars, &path).unwrap();

        let samples: Vec<i16> = hound::WavReader::open(&path)
            .unwrap()
            .into_samples::<i16>()
            .map(|sample| sample.unwrap())
            .collect();
        // Frame 0 is the comparison tick, the swap tone starts on frame 1.
        assert!(samples[..441 * 2].iter().all(|s| *s == 0));
        assert!(samples[441 * 2..].iter().any(|s| *s != 0));
    }

    #[test]
    fn sorted_input_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.wav");
        let bars = BarCollection::from_values(vec![0.0, 0.25, 0.5, 0.75]);

        let summary = export_sort_audio(&small_config(), bars, &path).unwrap();
        assert_eq!(summary.swaps, 0);
        let samples = hound::WavReader::open(&path).unwrap().into_samples::<i16>();
        assert!(samples.map(|s| s.unwrap()).all(|s| s == 0));
    }

    #[test]
    fn rejects_unpaced_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config();
        config.display.fps = 0;
        let err = export_sort_audio(
            &config,
            BarCollection::from_values(vec![0.0]),
            &dir.path().join("x.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, SortVizError::InvalidInput(_)));
    }
}
