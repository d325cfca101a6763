use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use vconfig::{Document, Section};

#[derive(Parser)]
#[command(name = "vconfig", version)]
#[command(about = "Inspect and merge multi-valued INI-like configuration files")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a file and print it back in canonical form
    Show { path: PathBuf },

    /// Print the single value of a variable
    Get {
        path: PathBuf,
        /// Section name; an empty string selects the global section
        section: String,
        variable: String,
        /// Printed when the variable is absent
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Print every value of a variable across all sections with the given name
    Values {
        path: PathBuf,
        section: String,
        variable: String,
    },

    /// List section names, or the sections matching a name
    Sections { path: PathBuf, name: Option<String> },

    /// Print the sections whose variable has exactly the given value
    Find {
        path: PathBuf,
        variable: String,
        value: String,
        /// Restrict the search to sections with this name
        #[arg(short, long, default_value = "")]
        section: String,
    },

    /// Merge files in order and print or write the result
    Merge {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => "vconfig=warn",
        1 => "vconfig=debug",
        _ => "vconfig=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load(path: &Path) -> Result<Document> {
    Document::read_from_file(path).with_context(|| format!("cannot load {}", path.display()))
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Show { path } => print!("{}", load(&path)?),
        Command::Get {
            path,
            section,
            variable,
            default,
        } => {
            let document = load(&path)?;
            let fallback = default.as_deref().unwrap_or_default();

            match document.get_single_value(&section, &variable, fallback) {
                Ok(value) => println!("{value}"),
                Err(e) if default.is_some() && e.default_value().is_some() => {
                    debug!("{e}");
                    println!("{fallback}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Values {
            path,
            section,
            variable,
        } => {
            let document = load(&path)?;
            for found in document.get_sections(&section)? {
                for value in found.get_values(&variable)? {
                    println!("{value}");
                }
            }
        }
        Command::Sections { path, name: None } => {
            let document = load(&path)?;
            for section in document.sections() {
                println!("{}\t{}", display_name(section), section.len());
            }
        }
        Command::Sections {
            path,
            name: Some(name),
        } => print_sections(&load(&path)?.get_sections(&name)?),
        Command::Find {
            path,
            variable,
            value,
            section,
        } => {
            let document = load(&path)?;
            print_sections(&document.get_sections_by_var(&section, &variable, &value)?);
        }
        Command::Merge { paths, output } => {
            let mut merged = Document::new();
            for path in &paths {
                merged.merge(&load(path)?);
            }

            match output {
                Some(output) => merged.write_to_file(&output)?,
                None => print!("{merged}"),
            }
        }
    }

    Ok(())
}

fn display_name(section: &Section) -> &str {
    if section.is_global() { "" } else { section.name() }
}

fn print_sections(sections: &[&Section]) {
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{section}");
    }
}
