//! CLI entry point for pattern counting, selection and sketching

use clap::Parser;
use motionpattern::io::cli::{Cli, CommandRunner};

fn main() -> motionpattern::Result<()> {
    let cli = Cli::parse();
    cli.init_tracing();
    let mut runner = CommandRunner::new(cli);
    runner.run()
}
