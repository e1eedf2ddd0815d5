use clap::Parser;
use kennel::cli::{run_cli, Cli};
use kennel::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logging = init_logging_with_config(&LogConfig::from_env())?;
    run_cli(cli)
}
