//! Core library for the Sort Visualiser application.
//!
//! A shuffled set of bars is bubble-sorted one comparison per frame. Each
//! module owns one piece of that loop:
//!
//! - [`bars`] holds the values being sorted and their colours.
//! - [`sort`] is the resumable bubble sort, advanced by single steps.
//! - [`tone`] and [`audio`] turn every swap into a short sine tone.
//! - [`render`] and [`display`] compose and present each frame.
//! - [`frame`] ties the pieces together at a fixed frame rate.
//! - [`record`] renders the same run offline into a WAV file.

pub mod audio;
pub mod bars;
pub mod config;
pub mod display;
pub mod error;
pub mod frame;
pub mod mapping;
pub mod record;
pub mod render;
pub mod sort;
pub mod timeline;
pub mod tone;

pub use audio::{AudioOutput, Mixer, MutedOutput, ToneSink};
pub use bars::{Bar, BarCollection};
pub use config::{AppConfig, AudioConfig, DisplayConfig, LabelConfig, SortConfig};
pub use display::{CrosstermEvents, DisplayEvent, EventSource, Screen, TerminalScreen};
pub use error::{Result, SortVizError};
pub use frame::{FrameLoop, FrameReport, Phase, RunSummary};
pub use mapping::{frequency_for, gradient_color, Rgb};
pub use record::{export_sort_audio, ExportSummary};
pub use render::{compose, FrameScene, SceneWidget};
pub use sort::{BubbleSorter, Pacing, Pair, SortStats, Step};
pub use timeline::FrameClock;
pub use tone::{Tone, ToneSynth};
