use std::{
    fs::File,
    io::{self, Stdout, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sort_visualiser_core::{
    export_sort_audio, AppConfig, AudioOutput, BarCollection, CrosstermEvents, FrameLoop,
    MutedOutput, Pacing, SortVizError, TerminalScreen, ToneSink,
};
use tracing_subscriber::EnvFilter;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Holds stderr log output while the alternate screen is up.
static STDERR_GATE: LogGate = LogGate::new();

fn main() -> sort_visualiser_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Live { options } => {
            init_tracing(options.log_file.as_deref(), "warn")?;
            run_live(&options)
        }
        Commands::Export { output, options } => {
            init_tracing(options.log_file.as_deref(), "info")?;
            run_export(&options, &output)
        }
    }
}

fn run_live(options: &RunOptions) -> sort_visualiser_core::Result<()> {
    let mut config = options.load_config()?;
    tracing::info!(
        bars = config.sort.bar_count,
        fps = config.display.fps,
        seed = config.sort.seed,
        muted = config.audio.muted,
        "starting live mode"
    );

    let bars = BarCollection::from_config(&config.sort);
    let audio: Box<dyn ToneSink> = if config.audio.muted {
        Box::new(MutedOutput::new())
    } else {
        let output = AudioOutput::open(config.audio.sample_rate)?;
        if output.sample_rate() != config.audio.sample_rate {
            tracing::info!(
                requested = config.audio.sample_rate,
                device = output.sample_rate(),
                "rendering tones at the device sample rate"
            );
            config.audio.sample_rate = output.sample_rate();
        }
        Box::new(output)
    };

    let terminal = enter_terminal(&config.display.title)?;
    let screen = TerminalScreen::new(terminal, CrosstermEvents);
    let mut frame_loop = FrameLoop::new(config, bars, screen, audio);
    let result = frame_loop.run();

    // Restore the terminal before reporting anything the loop returned.
    let restored = leave_terminal(frame_loop.into_screen().into_terminal());
    let summary = result?;
    restored?;

    tracing::info!(
        frames = summary.frames,
        comparisons = summary.stats.comparisons,
        swaps = summary.stats.swaps,
        "live mode finished"
    );
    Ok(())
}

fn run_export(options: &RunOptions, output: &Path) -> sort_visualiser_core::Result<()> {
    let config = options.load_config()?;
    tracing::info!(?output, bars = config.sort.bar_count, "exporting sort audio");

    let bars = BarCollection::from_config(&config.sort);
    let summary = export_sort_audio(&config, bars, output)?;
    println!(
        "wrote {} ({:.1}s, {} frames, {} swaps)",
        output.display(),
        summary.duration_seconds,
        summary.frames,
        summary.swaps
    );
    Ok(())
}

fn enter_terminal(title: &str) -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle(title))?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    STDERR_GATE.hold();
    Ok(terminal)
}

fn leave_terminal(mut terminal: Tui) -> io::Result<()> {
    let restored = disable_raw_mode()
        .and_then(|()| execute!(terminal.backend_mut(), LeaveAlternateScreen))
        .and_then(|()| terminal.show_cursor());
    STDERR_GATE.release_to(io::stderr())?;
    restored
}

fn init_tracing(
    log_file: Option<&Path>,
    default_level: &str,
) -> sort_visualiser_core::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(|| GatedStderr)
            .try_init(),
    };
    installed.map_err(|err| SortVizError::msg(format!("failed to install logger: {err}")))
}

/// Buffers log bytes while held and passes them straight through otherwise.
struct LogGate {
    state: Mutex<GateState>,
}

struct GateState {
    holding: bool,
    held: Vec<u8>,
}

impl LogGate {
    const fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                holding: false,
                held: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hold(&self) {
        self.lock().holding = true;
    }

    fn write_to(&self, buf: &[u8], mut out: impl Write) -> io::Result<usize> {
        let mut state = self.lock();
        if state.holding {
            state.held.extend_from_slice(buf);
            return Ok(buf.len());
        }
        drop(state);
        out.write(buf)
    }

    /// Stops holding and writes everything held so far to `out`.
    fn release_to(&self, mut out: impl Write) -> io::Result<()> {
        let held = {
            let mut state = self.lock();
            state.holding = false;
            std::mem::take(&mut state.held)
        };
        if held.is_empty() {
            return Ok(());
        }
        out.write_all(&held)?;
        out.flush()
    }
}

/// Log writer for stderr that goes quiet while the TUI owns the terminal.
struct GatedStderr;

impl Write for GatedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        STDERR_GATE.write_to(buf, io::stderr())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Bubble sort visualiser with sound", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort a shuffled set of bars in the terminal, one step per frame.
    Live {
        #[command(flatten)]
        options: RunOptions,
    },
    /// Run the sort headless and write its audio track to a WAV file.
    Export {
        /// Path of the WAV file to create.
        output: PathBuf,
        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Args, Debug)]
struct RunOptions {
    /// JSON configuration file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of bars to sort.
    #[arg(short, long)]
    bars: Option<usize>,
    /// Target frames per second (0 = as fast as possible).
    #[arg(long)]
    fps: Option<u32>,
    /// Seed for the initial shuffle.
    #[arg(long)]
    seed: Option<u64>,
    /// How often the sort yields to the renderer.
    #[arg(long, value_enum)]
    pacing: Option<PacingArg>,
    /// Disable sound.
    #[arg(long)]
    mute: bool,
    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl RunOptions {
    fn load_config(&self) -> sort_visualiser_core::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(bars) = self.bars {
            config.sort.bar_count = bars;
        }
        if let Some(fps) = self.fps {
            config.display.fps = fps;
        }
        if self.seed.is_some() {
            config.sort.seed = self.seed;
        }
        if let Some(pacing) = self.pacing {
            config.sort.pacing = pacing.into();
        }
        if self.mute {
            config.audio.muted = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PacingArg {
    /// Yield before each comparison and after each swap.
    Doubled,
    /// Yield once per comparison.
    Single,
}

impl From<PacingArg> for Pacing {
    fn from(value: PacingArg) -> Self {
        match value {
            PacingArg::Doubled => Pacing::Doubled,
            PacingArg::Single => Pacing::Single,
        }
    }
}
