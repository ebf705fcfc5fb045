//! embedgen CLI - Embedded Weight and IR Converter
//!
//! Command-line interface for converting neural amp models and cabinet IRs
//! into embeddable constexpr headers.

use clap::Parser;
use env_logger::Env;
use log::error;

use embedgen::cli::{commands, Cli, Commands};
use embedgen::Result;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if let Err(e) = handle_command(cli.command) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::ConvertModel {
            input,
            output_dir,
            batch,
            registry,
            force,
        } => commands::convert_model(&input, &output_dir, batch, registry, force),
        Commands::ConvertIr {
            input,
            output_dir,
            batch,
            registry,
            force,
        } => commands::convert_ir(&input, &output_dir, batch, registry, force),
        Commands::Verify { model, header } => commands::verify(&model, &header),
        Commands::Inspect { model } => commands::inspect(&model),
        Commands::TestInference { model } => commands::test_inference(&model),
    }
}
