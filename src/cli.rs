use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a call document into a Go program
    Generate {
        /// Input call document
        #[arg(long, default_value = "config.yaml")]
        yaml: PathBuf,
        /// Output directory
        #[arg(long, default_value = "generated_code")]
        out: PathBuf,
        /// Print the program instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Print the conditional outline of Go source files
    Extract {
        /// A .go file or a directory to walk
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = OutlineFormat::Yaml)]
        format: OutlineFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutlineFormat {
    Yaml,
    Json,
}
