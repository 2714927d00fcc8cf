//! Resumable bubble sort that advances by one comparison per call.
//!
//! [`BubbleSorter`] holds the loop counters of a textbook bubble sort as an
//! explicit state machine. Each call to [`BubbleSorter::step`] runs until the
//! next suspension point and reports what happened, so a frame loop can
//! render every intermediate arrangement.

use serde::{Deserialize, Serialize};

use crate::bars::BarCollection;

/// How often the sorter hands control back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Suspend before every comparison and again after every swap.
    #[default]
    Doubled,
    /// Suspend once per comparison.
    Single,
}

/// Adjacent positions `(position, position + 1)` examined during `pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub pass: usize,
    pub position: usize,
}

/// Outcome of one [`BubbleSorter::step`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Suspended right before comparing `pair`; nothing changed.
    Tick { pair: Pair },
    /// Compared `pair` without swapping.
    Compared { pair: Pair },
    /// Swapped `pair`. `value` belongs to the bar now at the lower position.
    Swapped { pair: Pair, value: f32 },
    /// The outer loop has completed. Returned on every later call as well.
    Finished,
}

/// Counters accumulated while sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    pub comparisons: u64,
    pub swaps: u64,
    /// Number of times `step` suspended without finishing.
    pub suspensions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Resume {
    Start,
    BeforeCompare { pair: Pair, ticked: bool },
    AfterSwap { pair: Pair },
    Done,
}

#[derive(Debug, Clone)]
pub struct BubbleSorter {
    len: usize,
    pacing: Pacing,
    resume: Resume,
    stats: SortStats,
}

impl BubbleSorter {
    /// Creates a sorter for a collection of `len` bars.
    pub fn new(len: usize, pacing: Pacing) -> Self {
        Self {
            len,
            pacing,
            resume: Resume::Start,
            stats: SortStats::default(),
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn stats(&self) -> SortStats {
        self.stats
    }

    /// Total comparisons a full run performs: `n(n-1)/2`.
    pub fn total_comparisons(&self) -> u64 {
        let n = self.len as u64;
        n * n.saturating_sub(1) / 2
    }

    /// Runs until the next suspension point.
    ///
    /// `bars` must be the collection the sorter was created for.
    pub fn step(&mut self, bars: &mut BarCollection) -> Step {
        debug_assert_eq!(bars.len(), self.len, "sorter driven with a different collection");

        loop {
            match self.resume {
                Resume::Done => return Step::Finished,
                Resume::Start => {
                    self.resume = self.resume_at(self.first_pair());
                }
                Resume::AfterSwap { pair } => {
                    self.resume = self.resume_at(self.next_pair(pair));
                }
                Resume::BeforeCompare { pair, ticked } => {
                    if self.pacing == Pacing::Doubled && !ticked {
                        self.resume = Resume::BeforeCompare { pair, ticked: true };
                        return self.suspend(Step::Tick { pair });
                    }

                    let j = pair.position;
                    self.stats.comparisons += 1;
                    let (left, right) = match (bars.get(j), bars.get(j + 1)) {
                        (Some(left), Some(right)) => (left.value, right.value),
                        _ => {
                            self.resume = Resume::Done;
                            return Step::Finished;
                        }
                    };

                    if left > right {
                        bars.swap_adjacent(j);
                        self.stats.swaps += 1;
                        self.resume = Resume::AfterSwap { pair };
                        return self.suspend(Step::Swapped { pair, value: right });
                    }

                    self.resume = self.resume_at(self.next_pair(pair));
                    if self.pacing == Pacing::Single {
                        return self.suspend(Step::Compared { pair });
                    }
                }
            }
        }
    }

    /// Steps until [`Step::Finished`], returning the final statistics.
    pub fn run_to_end(&mut self, bars: &mut BarCollection) -> SortStats {
        while self.step(bars) != Step::Finished {}
        self.stats
    }

    fn suspend(&mut self, step: Step) -> Step {
        self.stats.suspensions += 1;
        step
    }

    fn resume_at(&self, pair: Option<Pair>) -> Resume {
        match pair {
            Some(pair) => Resume::BeforeCompare { pair, ticked: false },
            None => Resume::Done,
        }
    }

    fn first_pair(&self) -> Option<Pair> {
        self.pass_start(0)
    }

    fn next_pair(&self, pair: Pair) -> Option<Pair> {
        if pair.position + 1 < self.inner_len(pair.pass) {
            Some(Pair {
                pass: pair.pass,
                position: pair.position + 1,
            })
        } else {
            self.pass_start(pair.pass + 1)
        }
    }

    /// First pair of the earliest pass at or after `pass` that compares
    /// anything.
    fn pass_start(&self, pass: usize) -> Option<Pair> {
        (pass..self.len)
            .find(|&pass| self.inner_len(pass) > 0)
            .map(|pass| Pair { pass, position: 0 })
    }

    fn inner_len(&self, pass: usize) -> usize {
        self.len.saturating_sub(pass + 1)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn drive(values: Vec<f32>, pacing: Pacing) -> (BarCollection, BubbleSorter, Vec<Step>) {
        let mut bars = BarCollection::from_values(values);
        let mut sorter = BubbleSorter::new(bars.len(), pacing);
        let mut steps = Vec::new();
        loop {
            let step = sorter.step(&mut bars);
            if step == Step::Finished {
                break;
            }
            assert!(bars.indices_consistent());
            steps.push(step);
        }
        (bars, sorter, steps)
    }

    #[test]
    fn sorts_the_four_bar_example() {
        let (bars, sorter, _) = drive(vec![0.75, 0.0, 0.5, 0.25], Pacing::Doubled);

        assert_eq!(bars.values(), vec![0.0, 0.25, 0.5, 0.75]);
        let indices: Vec<usize> = bars.iter().map(|bar| bar.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        let stats = sorter.stats();
        assert_eq!(stats.comparisons, 6);
        assert!(stats.swaps <= 6);
        assert_eq!(stats.suspensions, 6 + stats.swaps);
    }

    #[test]
    fn first_step_is_a_tick_without_changes() {
        let mut bars = BarCollection::from_values(vec![0.5, 0.0]);
        let mut sorter = BubbleSorter::new(2, Pacing::Doubled);

        let step = sorter.step(&mut bars);
        assert_eq!(
            step,
            Step::Tick {
                pair: Pair { pass: 0, position: 0 }
            }
        );
        assert_eq!(bars.values(), vec![0.5, 0.0]);

        match sorter.step(&mut bars) {
            Step::Swapped { value, .. } => assert_eq!(value, 0.0),
            other => panic!("expected swap, got {other:?}"),
        }
        assert_eq!(bars.values(), vec![0.0, 0.5]);
        assert_eq!(sorter.step(&mut bars), Step::Finished);
    }

    #[test]
    fn suspension_count_matches_comparisons_plus_swaps() {
        for seed in 0..20 {
            for n in [1usize, 2, 3, 7, 16, 33] {
                let values = BarCollection::shuffled(n, &mut StdRng::seed_from_u64(seed)).values();
                let (bars, sorter, steps) = drive(values, Pacing::Doubled);
                let stats = sorter.stats();
                let expected = (n * n.saturating_sub(1) / 2) as u64;

                assert!(bars.is_sorted());
                assert_eq!(stats.comparisons, expected);
                assert_eq!(stats.suspensions, expected + stats.swaps);
                assert_eq!(steps.len() as u64, stats.suspensions);
                let swapped = steps
                    .iter()
                    .filter(|step| matches!(step, Step::Swapped { .. }))
                    .count() as u64;
                assert_eq!(swapped, stats.swaps);
            }
        }
    }

    #[test]
    fn sorted_input_still_runs_every_comparison() {
        let values: Vec<f32> = (0..10).map(|k| k as f32 / 10.0).collect();
        let (_, sorter, steps) = drive(values, Pacing::Doubled);
        assert_eq!(sorter.stats().swaps, 0);
        assert_eq!(steps.len(), 45);
        assert!(steps.iter().all(|step| matches!(step, Step::Tick { .. })));
    }

    #[test]
    fn reversed_input_swaps_on_every_comparison() {
        let values: Vec<f32> = (0..8).rev().map(|k| k as f32 / 8.0).collect();
        let (bars, sorter, _) = drive(values, Pacing::Doubled);
        assert!(bars.is_sorted());
        assert_eq!(sorter.stats().swaps, 28);
        assert_eq!(sorter.stats().suspensions, 56);
    }

    #[test]
    fn single_pacing_suspends_once_per_comparison() {
        let values = BarCollection::shuffled(12, &mut StdRng::seed_from_u64(5)).values();
        let (bars, sorter, steps) = drive(values, Pacing::Single);
        assert!(bars.is_sorted());
        assert_eq!(sorter.stats().suspensions, 66);
        assert!(steps.iter().all(|step| !matches!(step, Step::Tick { .. })));
    }

    #[test]
    fn trivial_inputs_finish_immediately() {
        for values in [vec![], vec![0.0]] {
            let mut bars = BarCollection::from_values(values);
            let mut sorter = BubbleSorter::new(bars.len(), Pacing::Doubled);
            assert_eq!(sorter.step(&mut bars), Step::Finished);
            assert_eq!(sorter.stats().suspensions, 0);
        }
    }

    #[test]
    fn total_comparisons_matches_a_full_run() {
        let (_, sorter, _) = drive(vec![0.75, 0.0, 0.5, 0.25], Pacing::Doubled);
        assert_eq!(sorter.total_comparisons(), 6);
        assert_eq!(sorter.stats().comparisons, sorter.total_comparisons());

        assert_eq!(BubbleSorter::new(0, Pacing::Single).total_comparisons(), 0);
        assert_eq!(BubbleSorter::new(1, Pacing::Single).total_comparisons(), 0);
        assert_eq!(BubbleSorter::new(100, Pacing::Single).total_comparisons(), 4950);
    }

    #[test]
    fn finished_sorter_leaves_bars_alone() {
        let mut bars = BarCollection::from_values(vec![0.75, 0.0, 0.5, 0.25]);
        let mut sorter = BubbleSorter::new(4, Pacing::Doubled);
        let stats = sorter.run_to_end(&mut bars);

        for _ in 0..5 {
            assert_eq!(sorter.step(&mut bars), Step::Finished);
        }
        assert_eq!(bars.values(), vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(sorter.stats(), stats);
    }
}
