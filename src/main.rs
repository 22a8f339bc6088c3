//! Command-line entry point for the Bambu-to-Prusa converter.

use bambu2prusa::{Converter, Template, default_output_path};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "bambu2prusa", version)]
#[command(about = "Convert Bambu Studio 3mf files to PrusaSlicer 3mf files")]
struct Args {
    /// Input Bambu 3mf file
    input: PathBuf,

    /// Output Prusa 3mf file (default: <input>-prusa.3mf)
    output: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short, long)]
    verbose: bool,

    /// Alternate template asset directory (default: the embedded assets)
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if !args.input.exists() {
        eprintln!("Error: input file '{}' not found", args.input.display());
        return ExitCode::FAILURE;
    }

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    let template = match &args.templates {
        Some(dir) => match Template::from_dir(dir) {
            Ok(template) => template,
            Err(err) => {
                eprintln!("Error: {}", err);
                return ExitCode::FAILURE;
            }
        },
        None => Template::bundled(),
    };

    let converter = Converter::with_template(&args.input, &output, template);
    match converter.run() {
        Ok(()) => {
            println!("Output file created: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
