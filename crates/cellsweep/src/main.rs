use std::io::{self, BufWriter};

use cellsweep::{Cli, commands, default_log_dir, init_logging};
use clap::Parser;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let log_dir = (!cli.no_log_file).then(|| cli.log_dir.clone().unwrap_or_else(default_log_dir));

    init_logging(log_dir.as_deref(), &cli.log_level)?;

    let mut out = BufWriter::new(io::stdout().lock());
    commands::run(cli.command, &mut out)
}
