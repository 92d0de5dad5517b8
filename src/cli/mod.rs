pub mod export;
pub mod validate;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::formats::Format;

/// edlint - validators and JSON exporters for lib/edit data files
#[derive(Parser, Debug)]
#[command(name = "edlint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared per-format arguments: an optional file path and one action.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Path to the data file (default: lib/edit/<format>.txt)
    pub file: Option<PathBuf>,

    /// Validate the file format and integrity
    #[arg(long)]
    pub validate: bool,

    /// Export all records to JSON (stdout)
    #[arg(long)]
    pub export_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with ability.txt
    Ability(FormatArgs),
    /// Work with artefact.txt
    Artefact(FormatArgs),
    /// Work with flavor.txt
    Flavor(FormatArgs),
    /// Work with history.txt
    History(FormatArgs),
    /// Work with house.txt
    House(FormatArgs),
    /// Work with limits.txt
    Limits(FormatArgs),
    /// Work with monster.txt
    Monster(FormatArgs),
    /// Work with names.txt
    Names(FormatArgs),
    /// Work with object.txt
    Object(FormatArgs),
    /// Work with race.txt
    Race(FormatArgs),
    /// Work with special.txt
    Special(FormatArgs),
    /// Work with terrain.txt
    Terrain(FormatArgs),
    /// Work with vault.txt
    Vault(FormatArgs),
}

/// Dispatch a parsed command line; returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let (format, args) = match cli.command {
        Commands::Ability(args) => (Format::Ability, args),
        Commands::Artefact(args) => (Format::Artefact, args),
        Commands::Flavor(args) => (Format::Flavor, args),
        Commands::History(args) => (Format::History, args),
        Commands::House(args) => (Format::House, args),
        Commands::Limits(args) => (Format::Limits, args),
        Commands::Monster(args) => (Format::Monster, args),
        Commands::Names(args) => (Format::Names, args),
        Commands::Object(args) => (Format::Object, args),
        Commands::Race(args) => (Format::Race, args),
        Commands::Special(args) => (Format::Special, args),
        Commands::Terrain(args) => (Format::Terrain, args),
        Commands::Vault(args) => (Format::Vault, args),
    };
    run_format(format, args)
}

/// Run one format tool with resolved arguments.
pub fn run_format(format: Format, args: FormatArgs) -> Result<i32> {
    let schema = format.schema();
    let file = args
        .file
        .unwrap_or_else(|| PathBuf::from("lib/edit").join(schema.file_name));

    if args.validate {
        validate::run(format, &file)
    } else if args.export_json {
        export::run(format, &file)
    } else {
        eprintln!("No action specified. Use --validate or --export-json.");
        eprintln!("Run with --help for more information.");
        Ok(1)
    }
}
