#![deny(clippy::all, clippy::pedantic)]

mod app;

use anyhow::Result;
use clap::Parser;
use demsim::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    app::run(&args)
}
