//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use scenario::Scenario;
use tracing::Level;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "demsim", version, about = "Run a DEM granular-flow scenario")]
pub struct Args {
    /// Scenario JSON file.
    pub scenario: PathBuf,

    /// Run exactly this many steps, overriding the scenario.
    #[arg(long, conflicts_with = "max_time")]
    pub steps: Option<u64>,

    /// Run until this simulated time, overriding the scenario.
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Log a progress line every N steps; 0 disables progress logging.
    #[arg(long, default_value_t = 100)]
    pub log_every: u64,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Use explicit drag instead of the unconditionally stable implicit form.
    #[arg(long)]
    pub explicit: bool,

    /// Do not record per-particle history.
    #[arg(long)]
    pub low_memory: bool,

    /// Write a JSON snapshot of the final state.
    #[arg(long, value_name = "JSON")]
    pub snapshot: Option<PathBuf>,

    /// Write the final state as raw f32 `[x, y, z, speed]` records.
    #[arg(long, value_name = "FILE")]
    pub raw: Option<PathBuf>,
}

impl Args {
    #[must_use]
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Folds the command-line overrides into a loaded scenario.
    pub fn apply(&self, scenario: &mut Scenario) {
        let settings = &mut scenario.settings;
        if self.explicit {
            settings.implicit_drag = false;
        }
        if self.low_memory {
            settings.record_history = false;
        }
        if let Some(steps) = self.steps {
            settings.steps = Some(steps);
            settings.max_time = None;
        }
        if let Some(max_time) = self.max_time {
            settings.steps = None;
            settings.max_time = Some(max_time);
        }
    }
}
