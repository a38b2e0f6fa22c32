use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use dart_cli::commands::{self, create::CreateOptions};
use dart_cli::parse_structure;
use dart_core::{Ppn, StructureVersion, WordFormat};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dart")]
#[command(about = "DART - list, extract and create DART backup tapes", long_about = None)]
#[command(version)]
struct Cli {
    /// More output; repeat for a debug trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the records of a tape
    List {
        /// Tape image (default: standard input)
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,

        /// Tape word format
        #[arg(short = 'T', long, default_value = "tape7")]
        format: WordFormat,

        /// Write the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract the files of a tape
    Extract {
        /// Tape image (default: standard input)
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,

        /// Tape word format
        #[arg(short = 'T', long, default_value = "tape7")]
        format: WordFormat,

        /// Word format of extracted files
        #[arg(short = 'W', long, default_value = "ascii")]
        content: WordFormat,

        /// Output directory
        #[arg(short = 'C', long, default_value = ".")]
        directory: PathBuf,
    },

    /// Write files to a new tape
    Create {
        /// Tape image (default: standard output)
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,

        /// Tape word format
        #[arg(short = 'T', long, default_value = "tape7")]
        format: WordFormat,

        /// Word format of the input files
        #[arg(short = 'W', long, default_value = "ascii")]
        content: WordFormat,

        /// Structure version (1, 2 or 3)
        #[arg(short = 's', long, default_value = "2", value_parser = parse_structure)]
        structure: StructureVersion,

        /// Owner of files not stored under a `prj,prg` directory
        #[arg(long)]
        owner: Option<Ppn>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,

        /// Files or directories to write
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Re-encode a tape image in another word format
    Convert {
        /// Tape image (default: standard input)
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,

        /// Input word format
        #[arg(short = 'T', long, default_value = "tape7")]
        format: WordFormat,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output word format
        #[arg(long)]
        to: WordFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::List { file, format, json } => {
            commands::list::execute(file.as_deref(), format, json)
        }

        Commands::Extract {
            file,
            format,
            content,
            directory,
        } => commands::extract::execute(
            file.as_deref(),
            format,
            content,
            &directory,
            cli.verbose > 0,
        ),

        Commands::Create {
            file,
            format,
            content,
            structure,
            owner,
            progress,
            files,
        } => {
            let options = CreateOptions {
                format,
                content,
                structure,
                owner,
                progress,
                verbose: cli.verbose > 0,
            };
            commands::create::execute(file.as_deref(), &files, &options)
        }

        Commands::Convert {
            file,
            format,
            output,
            to,
        } => commands::convert::execute(file.as_deref(), format, &output, to).map(|_| ()),
    }
}
