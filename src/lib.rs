pub mod config;
pub mod core;
pub mod domain;
pub mod pysource;
pub mod utils;

pub use config::file::FileConfig;
pub use config::{cli::LocalStorage, CliConfig};
pub use core::{engine::ExportEngine, pipeline::SdkExportPipeline};
pub use utils::error::{ExportError, Result};
