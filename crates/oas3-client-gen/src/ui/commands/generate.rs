use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use super::load_document;
use crate::{
  generator::{
    metrics::GenerationStats,
    orchestrator::{GeneratorConfig, Orchestrator, ParameterMerge, QueryParams},
  },
  ui::{Colors, GenerateCommand},
  utils::validate_document,
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub client_name: Option<String>,
  pub parameter_merge: ParameterMerge,
  pub query_params: QueryParams,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      client_name,
      dedupe_parameters,
      respect_query_required,
      verbose,
      quiet,
    } = command;

    if input == output {
      anyhow::bail!("Output path must differ from the input document: {}", input.display());
    }

    let client_name = client_name.map(|name| name.trim().to_string());
    if client_name.as_deref().is_some_and(str::is_empty) {
      anyhow::bail!("--client-name must not be empty");
    }

    Ok(Self {
      input,
      output,
      client_name,
      parameter_merge: if dedupe_parameters {
        ParameterMerge::LastWins
      } else {
        ParameterMerge::KeepAll
      },
      query_params: if respect_query_required {
        QueryParams::RespectRequired
      } else {
        QueryParams::AlwaysOptional
      },
      verbose,
      quiet,
    })
  }

  pub fn generator_config(&self) -> GeneratorConfig {
    GeneratorConfig::builder()
      .maybe_client_name(self.client_name.clone())
      .parameter_merge(self.parameter_merge)
      .query_params(self.query_params)
      .build()
  }

  async fn write_output(&self, code: String) -> anyhow::Result<()> {
    if let Some(parent) = self.output.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&self.output, code)
      .await
      .with_context(|| format!("failed to write {}", self.output.display()))
  }
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        message.with(self.colors.primary())
      );
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Models generated:", stats.models_generated.to_string());
    self.stat("", format!("{} structs", stats.structs_generated));
    self.stat("", format!("{} type aliases", stats.type_aliases_generated));
    if stats.composites_generated > 0 {
      self.stat("", format!("{} with a flattened parent", stats.composites_generated));
    }
    self.stat(
      "Methods generated:",
      format!("{} of {} operations", stats.methods_generated, stats.operations_found),
    );
    if stats.security_headers_generated > 0 {
      self.stat("Security headers:", stats.security_headers_generated.to_string());
    }
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_cycles(stats);
    self.print_warnings(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Recursive cycles:", stats.cycles_detected.to_string());

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.join(" -> ").with(self.colors.info())
        );
      }
    }
  }

  /// Skipped operations always print; other warnings only with `--verbose`.
  fn print_warnings(&self, stats: &GenerationStats) {
    let visible: Vec<_> = stats
      .warnings
      .iter()
      .filter(|warning| warning.is_skipped_item() || self.config.verbose)
      .collect();
    if visible.is_empty() {
      return;
    }

    println!();
    for warning in visible {
      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated Rust client".with(self.colors.success())
      );
    }
  }
}

/// Loads, validates and generates. Nothing is written when any step fails.
pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<GenerationStats> {
  let logger = GenerateLogger::new(&config, colors);

  logger.info(&format!("Loading OpenAPI document from: {}", config.input.display()));
  let document = load_document(&config.input).await?;
  validate_document(&document).with_context(|| format!("{} is not a valid OpenAPI document", config.input.display()))?;

  logger.info("Generating Rust client...");
  let source_path = config.input.display().to_string();
  let output = Orchestrator::new(document, config.generator_config())
    .generate(&source_path)
    .context("code generation failed")?;
  logger.print_statistics(&output.stats);

  logger.info(&format!("Writing to: {}", config.output.display()));
  config.write_output(output.code).await?;

  logger.log_success();
  Ok(output.stats)
}
