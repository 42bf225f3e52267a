//! `cellmark` executable entry point.

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cellmark_cli::Cli::parse();
    print!("{}", cellmark_cli::run(cli)?);
    Ok(())
}
