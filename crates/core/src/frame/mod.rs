use crate::{
    audio::ToneSink,
    bars::BarCollection,
    config::AppConfig,
    display::{DisplayEvent, Screen},
    render::compose,
    sort::{BubbleSorter, SortStats, Step},
    timeline::FrameClock,
    tone::ToneSynth,
    Result,
};

/// The loop only ever moves from `Sorting` to `Sorted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Sorting,
    Sorted,
}

/// State after one call to [`FrameLoop::run_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub phase: Phase,
    pub running: bool,
    /// Engine outcome for this frame; `None` once sorted.
    pub step: Option<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub phase: Phase,
    pub stats: SortStats,
}

/// Drives one sort step and one redraw per frame.
pub struct FrameLoop<S: Screen, A: ToneSink> {
    config: AppConfig,
    bars: BarCollection,
    sorter: BubbleSorter,
    synth: ToneSynth,
    clock: FrameClock,
    screen: S,
    audio: A,
    phase: Phase,
    running: bool,
}

impl<S: Screen, A: ToneSink> FrameLoop<S, A> {
    pub fn new(config: AppConfig, bars: BarCollection, screen: S, audio: A) -> Self {
        let sorter = BubbleSorter::new(bars.len(), config.sort.pacing);
        let synth = ToneSynth::new(&config.audio);
        let clock = FrameClock::new(config.display.fps);
        Self {
            config,
            bars,
            sorter,
            synth,
            clock,
            screen,
            audio,
            phase: Phase::Sorting,
            running: true,
        }
    }

    /// Replaces the frame clock, e.g. with [`FrameClock::unthrottled`].
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn bars(&self) -> &BarCollection {
        &self.bars
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stats(&self) -> SortStats {
        self.sorter.stats()
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Hands the screen back, e.g. to restore the terminal on exit.
    pub fn into_screen(self) -> S {
        self.screen
    }

    /// Runs frames until the screen asks to close.
    pub fn run(&mut self) -> Result<RunSummary> {
        tracing::info!(
            bars = self.bars.len(),
            fps = self.config.display.fps,
            period = ?self.clock.period(),
            pacing = ?self.sorter.pacing(),
            comparisons = self.sorter.total_comparisons(),
            "frame loop started"
        );

        while self.running {
            self.run_frame()?;
        }

        let summary = self.summary();
        tracing::info!(
            frames = summary.frames,
            comparisons = summary.stats.comparisons,
            swaps = summary.stats.swaps,
            phase = ?summary.phase,
            "frame loop stopped"
        );
        Ok(summary)
    }

    pub fn run_frame(&mut self) -> Result<FrameReport> {
        self.clock.tick();

        for event in self.screen.poll_events()? {
            match event {
                DisplayEvent::CloseRequested => {
                    tracing::debug!("close requested");
                    self.running = false;
                }
            }
        }

        let step = match self.phase {
            Phase::Sorting => Some(self.advance_sort()?),
            Phase::Sorted => None,
        };

        self.bars.resync_indices();

        let scene = compose(&self.bars, &self.config.display, &self.config.labels);
        self.screen.present(&scene)?;

        Ok(FrameReport {
            phase: self.phase,
            running: self.running,
            step,
        })
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.clock.frames(),
            phase: self.phase,
            stats: self.sorter.stats(),
        }
    }

    fn advance_sort(&mut self) -> Result<Step> {
        let step = self.sorter.step(&mut self.bars);
        match step {
            Step::Swapped { value, .. } => {
                self.audio.play(self.synth.render(value))?;
            }
            Step::Finished => {
                self.phase = Phase::Sorted;
                let stats = self.sorter.stats();
                tracing::info!(
                    frame = self.clock.frames(),
                    comparisons = stats.comparisons,
                    swaps = stats.swaps,
                    "sorting finished"
                );
            }
            Step::Tick { .. } | Step::Compared { .. } => {}
        }
        Ok(step)
    }
}
