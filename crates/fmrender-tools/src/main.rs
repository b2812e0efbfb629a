use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fmrender::RenderConfig;
use fmrender::render::config::{DEFAULT_BUSY_CYCLES, DEFAULT_CLOCK_HZ, DEFAULT_CLOCK_STEP};

mod input;
mod render;
use input::load_timeline;
use render::{Length, print_info, print_trace, render_wav};

/// fmrender command line tools
#[derive(Parser)]
#[command(
    name = "fmrender",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Chip clocking shared by all subcommands
#[derive(Args, Debug, Clone, Copy)]
struct ClockArgs {
    /// Internal chip clock in Hz
    #[arg(long, default_value_t = DEFAULT_CLOCK_HZ)]
    clock: u32,
    /// Internal cycles per output frame
    #[arg(long, default_value_t = DEFAULT_CLOCK_STEP)]
    step: u32,
    /// Cycles the register bus stays busy after each access
    #[arg(long, default_value_t = DEFAULT_BUSY_CYCLES)]
    busy: u32,
}

impl ClockArgs {
    fn config(&self) -> Result<RenderConfig> {
        RenderConfig::new(self.clock, self.step, self.busy).context("invalid clock settings")
    }
}

/// Render length; defaults to the timeline duration plus one second
#[derive(Args, Debug, Clone, Copy)]
#[group(multiple = false)]
struct LengthArgs {
    /// Number of output frames to render
    #[arg(long)]
    frames: Option<usize>,
    /// Duration to render in seconds
    #[arg(long)]
    seconds: Option<f64>,
}

impl LengthArgs {
    fn length(&self) -> Length {
        match (self.frames, self.seconds) {
            (Some(n), _) => Length::Frames(n),
            (None, Some(s)) => Length::Seconds(s),
            (None, None) => Length::Auto,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render a timeline to a 32-bit float stereo WAV file (use '-' for stdin)
    Render {
        #[arg(value_name = "TIMELINE")]
        file: PathBuf,
        /// Output WAV path
        #[arg(short, long, value_name = "WAV")]
        output: PathBuf,
        #[command(flatten)]
        clock: ClockArgs,
        #[command(flatten)]
        length: LengthArgs,
    },
    /// Print the frame each register bus operation is issued on
    Trace {
        #[arg(value_name = "TIMELINE")]
        file: PathBuf,
        #[command(flatten)]
        clock: ClockArgs,
        #[command(flatten)]
        length: LengthArgs,
    },
    /// Show summary info for a timeline
    Info {
        #[arg(value_name = "TIMELINE")]
        file: PathBuf,
        #[command(flatten)]
        clock: ClockArgs,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Render {
            file,
            output,
            clock,
            length,
        } => {
            let timeline = load_timeline(&file)?;
            render_wav(&timeline, clock.config()?, length.length(), &output)?;
        }
        Commands::Trace {
            file,
            clock,
            length,
        } => {
            let timeline = load_timeline(&file)?;
            print_trace(&timeline, clock.config()?, length.length())?;
        }
        Commands::Info { file, clock } => {
            let timeline = load_timeline(&file)?;
            print_info(&file, &timeline, clock.config()?);
        }
    }

    Ok(())
}
