#![deny(clippy::all, clippy::pedantic)]
//! # demsim
//!
//! Command-line driver for DEM scenarios. The binary loads a
//! [`scenario::Scenario`], applies the command-line overrides in [`cli`],
//! steps the resulting [`dem::Simulation`] and writes the final particle
//! state through [`export`].
//!
//! ```text
//! demsim scenarios/closed_box.json --max-time 0.5 --snapshot out.json -v
//! ```

pub mod cli;
pub mod export;

pub use cli::Args;
