//! Pure mappings from a bar's data to what the user sees and hears.

use serde::{Deserialize, Serialize};

/// Lowest pitch a bar can produce, reached by value `0.0`.
pub const BASE_FREQUENCY_HZ: f32 = 180.0;
/// Pitch added across the full `[0, 1)` value range.
pub const FREQUENCY_SPAN_HZ: f32 = 1000.0;

/// Opaque 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Composites `self` at `alpha` (0 = transparent, 255 = opaque) over
    /// `below`.
    pub fn over(self, below: Rgb, alpha: u8) -> Rgb {
        let a = alpha as u32;
        let mix = |top: u8, bottom: u8| -> u8 {
            ((top as u32 * a + bottom as u32 * (255 - a) + 127) / 255) as u8
        };
        Rgb {
            r: mix(self.r, below.r),
            g: mix(self.g, below.g),
            b: mix(self.b, below.b),
        }
    }
}

/// Pitch in Hz for a bar value.
pub fn frequency_for(value: f32) -> f32 {
    BASE_FREQUENCY_HZ + value * FREQUENCY_SPAN_HZ
}

/// Colour assigned to the bar created at `index` out of `total`.
///
/// Red rises and green falls with the index so that the gradient encodes the
/// bar's original rank. Blue is fixed.
pub fn gradient_color(index: usize, total: usize) -> Rgb {
    if total == 0 {
        return Rgb::new(100, 180, 220);
    }
    let position = index as f32 / total as f32;
    let remaining = (total - index.min(total)) as f32 / total as f32;
    Rgb {
        r: (100.0 + 155.0 * position) as u8,
        g: (100.0 + 80.0 * remaining) as u8,
        b: 220,
    }
}

/// Horizontal space each bar occupies, in logical pixels.
pub fn bar_width(total_width: u32, bar_count: usize) -> u32 {
    if bar_count == 0 {
        return 0;
    }
    total_width / bar_count as u32
}

/// Bar height in logical pixels for a value scaled to the full window height.
pub fn bar_height(value: f32, total_height: u32) -> u32 {
    ((value * total_height as f32) as u32).min(total_height)
}
