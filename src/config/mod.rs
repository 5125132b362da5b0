pub mod cli;
pub mod file;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Relative SDK location when the tool runs from a sibling checkout.
pub const DEFAULT_SDK_PATH: &str = "../FitSDKRelease_21.171.00/py/garmin_fit_sdk";
pub const DEFAULT_OUTPUT_DIR: &str = "fit_data_export";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "fit-export")]
#[command(about = "Convert Garmin FIT SDK profile and fit data to JSON")]
pub struct CliConfig {
    /// Path to the SDK directory containing profile.py and fit.py
    #[arg(short, long, default_value = DEFAULT_SDK_PATH)]
    pub path: String,

    /// Directory the JSON files are written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Load path and output settings from a TOML file instead
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase CPU and memory usage")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn sdk_path(&self) -> &str {
        &self.path
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn pretty(&self) -> bool {
        self.pretty
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("path", &self.path)?;
        validation::validate_path("output", &self.output)?;
        Ok(())
    }
}
