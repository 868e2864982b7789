use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-packages")]
#[command(about = "Inspect the package structure of a Java class universe")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON class manifest
    #[arg(long, value_name = "FILE", global = true)]
    pub universe: Option<PathBuf>,

    /// Jar to catalog, may be repeated
    #[arg(long = "jar", value_name = "FILE", global = true)]
    pub jars: Vec<PathBuf>,

    /// Directory scanned for jars
    #[arg(long, value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    /// Increase log verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Sub-package tree below a package
    Tree { package: String },
    /// Classes of a package
    Classes {
        package: String,

        /// Only public, non package-info classes
        #[arg(long)]
        exposed: bool,

        /// Exclude sub-packages
        #[arg(long)]
        single: bool,
    },
    /// Annotation governing a package
    Annotation {
        package: String,
        annotation_type: String,
    },
    /// Packages whose package info carries an annotation
    Annotated {
        package: String,
        annotation_type: String,
    },
    Stats,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
