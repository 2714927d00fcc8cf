use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Pacing, Result, SortVizError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub sort: SortConfig,
    pub audio: AudioConfig,
    pub labels: LabelConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the frame loop and synthesiser cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.sort.bar_count == 0 {
            return Err(SortVizError::InvalidInput("bar count must be at least one"));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(SortVizError::InvalidInput("display size must be non-zero"));
        }
        if self.sort.bar_count > self.display.width as usize {
            return Err(SortVizError::InvalidInput(
                "bar count cannot exceed the display width",
            ));
        }
        if self.audio.sample_rate == 0 {
            return Err(SortVizError::InvalidInput("sample rate must be non-zero"));
        }
        if self.audio.tone_ms == 0 {
            return Err(SortVizError::InvalidInput("tone duration must be non-zero"));
        }
        Ok(())
    }
}

/// Logical window size and refresh rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Target frames per second. Zero disables frame pacing.
    pub fps: u32,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            fps: 144,
            title: "Bubble Sort Visualiser".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub bar_count: usize,
    /// Seed for the initial shuffle; `None` draws from the OS.
    pub seed: Option<u64>,
    pub pacing: Pacing,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            bar_count: 100,
            seed: None,
            pacing: Pacing::Doubled,
        }
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub tone_ms: u32,
    pub amplitude: f32,
    /// Exponential envelope decay rate, per second.
    pub decay: f32,
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            tone_ms: 70,
            amplitude: 0.3,
            decay: 4.0,
            muted: false,
        }
    }
}

/// Static text drawn over the bars every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub watermark: String,
    pub corner_tag: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            watermark: "Bubble Sort".to_string(),
            corner_tag: "sort-visualiser // bubble".to_string(),
        }
    }
}
