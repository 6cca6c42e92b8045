use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-client-gen")]
#[command(author, version, about = "Generates typed async Rust API clients from OpenAPI 3 documents")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Generate a Rust client module from an OpenAPI document
  Generate(GenerateCommand),
  /// Check that a document is a well-formed OpenAPI 3 document
  Validate(ValidateCommand),
  /// List information from an OpenAPI document
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Path to the OpenAPI document (JSON, or YAML with a .yaml/.yml extension)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Path where the generated Rust client will be written
  #[arg(short, long, value_name = "FILE")]
  pub output: PathBuf,

  /// Name of the generated client struct (default: `<Title>Client`)
  #[arg(long, value_name = "NAME")]
  pub client_name: Option<String>,

  /// Keep only the last declaration when a parameter is declared more than once
  #[arg(long, default_value_t = false)]
  pub dedupe_parameters: bool,

  /// Make required query parameters required in method signatures
  #[arg(long, default_value_t = false)]
  pub respect_query_required: bool,

  /// Enable verbose output, including every warning
  #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateCommand {
  /// Path to the OpenAPI document
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Print the verdict as JSON
  #[arg(long, default_value_t = false)]
  pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List the client methods the document would produce
  Operations {
    /// Path to the OpenAPI document
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
