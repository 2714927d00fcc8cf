use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    config::SortConfig,
    mapping::{gradient_color, Rgb},
};

/// One element of the array being sorted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Sort key in `[0, 1)`; also drives pitch and height.
    pub value: f32,
    /// Current position in the owning [`BarCollection`].
    pub index: usize,
    /// Assigned from the initial index and never changed afterwards.
    pub color: Rgb,
}

/// Ordered sequence of bars whose `index` fields track their positions.
#[derive(Debug, Clone, Default)]
pub struct BarCollection {
    bars: Vec<Bar>,
}

impl BarCollection {
    /// Builds `count` bars holding the evenly spaced values `k / count`,
    /// shuffled with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut values: Vec<f32> = (0..count).map(|k| k as f32 / count as f32).collect();
        values.shuffle(rng);
        Self::from_values(values)
    }

    /// Shuffles `config.bar_count` bars, seeded when the config carries a
    /// seed.
    pub fn from_config(config: &SortConfig) -> Self {
        match config.seed {
            Some(seed) => Self::shuffled(config.bar_count, &mut StdRng::seed_from_u64(seed)),
            None => Self::shuffled(config.bar_count, &mut rand::rng()),
        }
    }

    /// Wraps the values in bars in the given order.
    pub fn from_values(values: Vec<f32>) -> Self {
        let total = values.len();
        let bars = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Bar {
                value,
                index,
                color: gradient_color(index, total),
            })
            .collect();
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Bar> {
        self.bars.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    pub fn values(&self) -> Vec<f32> {
        self.bars.iter().map(|bar| bar.value).collect()
    }

    /// Exchanges the bars at `position` and `position + 1` and renumbers them.
    ///
    /// Panics if `position + 1` is out of bounds.
    pub fn swap_adjacent(&mut self, position: usize) {
        self.bars.swap(position, position + 1);
        self.bars[position].index = position;
        self.bars[position + 1].index = position + 1;
    }

    /// Rewrites every bar's `index` to its actual position.
    pub fn resync_indices(&mut self) {
        for (position, bar) in self.bars.iter_mut().enumerate() {
            bar.index = position;
        }
    }

    pub fn indices_consistent(&self) -> bool {
        self.bars
            .iter()
            .enumerate()
            .all(|(position, bar)| bar.index == position)
    }

    pub fn is_sorted(&self) -> bool {
        self.bars.windows(2).all(|pair| pair[0].value <= pair[1].value)
    }
}

impl<'a> IntoIterator for &'a BarCollection {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
