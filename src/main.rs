//! `crumb`: a plain-text baking journal.

use clap::Parser as _;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
