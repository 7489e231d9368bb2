use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use parcomp::codec::Codec;

#[derive(Parser, Debug)]
#[clap(name = "parcomp", about = "Paradoxical compression: never expands, sometimes shrinks")]
enum Cli {
    /// Compress a file
    Compress { input: PathBuf, output: PathBuf },
    /// Decompress a file
    Decompress { input: PathBuf, output: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("parcomp: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let codec = Codec::default();
    match cli {
        Cli::Compress { input, output } => {
            let data = fs::read(&input)?;
            fs::write(&output, codec.compress(&data))?;
        }
        Cli::Decompress { input, output } => {
            let data = fs::read(&input)?;
            fs::write(&output, codec.decompress(&data)?)?;
        }
    }
    Ok(())
}
