use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use stickygen::cli::{Cli, EmitKind};
use stickygen::{GenError, Generator};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GenError>() {
                Some(error) => eprintln!("error[{}]: {error}", error.code()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// `STICKYGEN_LOG` takes precedence over `-v`.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_env("STICKYGEN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let generator = Generator::new(cli.generator_config());

    let output = match cli.emit {
        EmitKind::Source => generator.run(&cli.package, &cli.type_name)?,
        EmitKind::Spec => {
            let spec = generator.spec(&cli.package, &cli.type_name)?;
            let mut json = serde_json::to_string_pretty(&spec)?;
            json.push('\n');
            json
        }
    };

    match &cli.output {
        Some(path) => fs::write(path, &output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(output.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}
