use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use thiserror::Error;
use xmlshape::{PrettyPrintError, PrettyPrintOptions, TransformError};

#[derive(Parser, Debug)]
#[command(version, about = "Shape XML documents into JSON with path templates", long_about = None)]
struct Args {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON template to an XML document
    Transform {
        /// Template file
        #[arg(short, long)]
        template: PathBuf,
        /// XML input; stdin when omitted
        input: Option<PathBuf>,
        /// Print single-line JSON
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// Dump every element and its attributes as JSON
    ToJson {
        input: Option<PathBuf>,
    },
    /// Re-indent an XML document
    PrettyPrint {
        #[arg(long, default_value_t = PrettyPrintOptions::default().indent_size)]
        indent_size: usize,
        input: Option<PathBuf>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    PrettyPrint(#[from] PrettyPrintError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_input(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn main() -> Result<(), CliError> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match args.command {
        Command::Transform {
            template,
            input,
            compact,
        } => {
            let template = fs::read_to_string(template)?;
            let xml = read_input(input.as_ref())?;
            let output = xmlshape::transform(&xml, &template)?;
            let rendered = if compact {
                serde_json::to_string(&output)?
            } else {
                serde_json::to_string_pretty(&output)?
            };
            println!("{}", rendered);
        }
        Command::ToJson { input } => {
            let xml = read_input(input.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&xmlshape::to_json(&xml))?);
        }
        Command::PrettyPrint { indent_size, input } => {
            let xml = read_input(input.as_ref())?;
            let options = PrettyPrintOptions { indent_size };
            print!("{}", xmlshape::pretty_print(&xml, &options)?);
        }
    }
    Ok(())
}
