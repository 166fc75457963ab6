use crate::config::toml_config::TomlConfig;
use crate::config::SourceSettings;
use crate::domain::model::LookupQuery;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "station-enrich")]
#[command(about = "Enrich gas station addresses with county property records")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enrich every row of an input CSV and write the augmented CSV
    Run(RunArgs),

    /// Look up a single property and print its attributes as JSON
    Lookup(LookupArgs),

    /// Summarize current ownership from an exported tax list history CSV
    Analyze(AnalyzeArgs),
}

/// Portal settings shared by `run` and `lookup`. Flags override the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct SourceArgs {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Base URL of the property records portal
    #[arg(long)]
    pub base_url: Option<String>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Skip the tax list history request for each property
    #[arg(long)]
    pub no_tax_history: bool,

    /// Submit street addresses exactly as written (no LN -> Lane expansion)
    #[arg(long)]
    pub no_expand_suffixes: bool,
}

impl SourceArgs {
    /// Defaults, then the TOML file, then command-line flags.
    pub fn resolve(&self) -> Result<SourceSettings> {
        let mut settings = SourceSettings::default();

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            settings = TomlConfig::from_file(path)?.apply_to(settings);
        }

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if self.no_tax_history {
            settings.include_tax_history = false;
        }
        if self.no_expand_suffixes {
            settings.expand_street_suffixes = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct RunArgs {
    /// Input CSV with address, city, state, zip_code columns
    pub input_path: String,

    /// Output CSV path
    pub output_path: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Log process CPU and memory usage per phase
    #[arg(long)]
    pub monitor: bool,
}

impl ConfigProvider for RunArgs {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for RunArgs {
    fn validate(&self) -> Result<()> {
        validate_path("input_path", &self.input_path)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct LookupArgs {
    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub city: String,

    #[arg(long, default_value = "NJ")]
    pub state: String,

    #[arg(long, default_value = "")]
    pub zip_code: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

impl LookupArgs {
    pub fn query(&self) -> LookupQuery {
        LookupQuery {
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
        }
    }
}

impl Validate for LookupArgs {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("address", &self.address)?;
        validate_non_empty_string("city", &self.city)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// CSV with Year and Owner Info columns, most recent year first
    pub tax_history_path: String,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Validate for AnalyzeArgs {
    fn validate(&self) -> Result<()> {
        validate_path("tax_history_path", &self.tax_history_path)
    }
}
