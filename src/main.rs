//! Main Program for Tryduck
//! Run with `--help` for more instruction

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Error};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use tryduck::{Grid, RestoreOptions, ShuffleOptions, Source};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shuffle and restore images with encryption")]
struct Args {
    /// Worker threads for block copying (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shuffle an image
    Shuffle {
        /// Path to the input image
        #[arg(short = 'i', required_unless_present = "url")]
        input: Option<PathBuf>,

        /// Url of the image (takes precedence over -i)
        #[arg(short = 'u')]
        url: Option<String>,

        /// Number of rows to split the image
        #[arg(short = 'r', default_value_t = 50)]
        rows: usize,

        /// Number of columns to split the image
        #[arg(short = 'c', default_value_t = 50)]
        cols: usize,

        /// Password to encrypt the shuffle order
        #[arg(short = 'p')]
        password: String,

        /// Path to save the shuffled image
        #[arg(short = 'o')]
        output: PathBuf,

        /// Seed for a reproducible block order
        #[arg(long)]
        seed: Option<String>,
    },

    /// Restore a shuffled image
    Restore {
        /// Path to the shuffled image
        #[arg(short = 'i')]
        input: PathBuf,

        /// Password to decrypt the shuffle order
        #[arg(short = 'p')]
        password: String,

        /// Path to save the restored image
        #[arg(short = 'o')]
        output: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), Error> {
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match args.command {
        Command::Shuffle {
            input,
            url,
            rows,
            cols,
            password,
            output,
            seed,
        } => {
            let source = match (url, input) {
                (Some(url), _) => Source::Url(url),
                (None, Some(path)) => Source::Path(path),
                (None, None) => bail!("Either -i or -u is required"),
            };
            let options = ShuffleOptions {
                source,
                output,
                password,
                grid: Grid::new(rows, cols)?,
                seed,
            };

            tryduck::shuffle_image(&options).context("Failed to shuffle image")?;
            println!(
                "Success: Shuffled image saved to '{}'.",
                options.output.display()
            );
        }
        Command::Restore {
            input,
            password,
            output,
        } => {
            let options = RestoreOptions {
                input,
                output,
                password,
            };

            tryduck::restore_image(&options).context("Failed to restore image")?;
            println!(
                "Success: Restored image saved to '{}'.",
                options.output.display()
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
