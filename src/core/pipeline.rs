use crate::core::{ConfigProvider, ExportPlan, Pipeline, SdkModules, SourceModule, Storage};
use crate::domain::model::{
    FitTable, PyValue, FIT_EXPORT_TABLES, FIT_MODULE, PROFILE_FILENAME, PROFILE_MODULE,
    PROFILE_OBJECT,
};
use crate::pysource;
use crate::utils::error::{ExportError, Result};

/// One-shot export of the FIT SDK profile and base-type tables to JSON files.
pub struct SdkExportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SdkExportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn resolve(&self, module_name: &str) -> Result<SourceModule> {
        let path = self.config.sdk_path();
        tracing::debug!("Resolving {} module at: {}", module_name, path);
        pysource::find_module(path, module_name)?.ok_or_else(|| {
            ExportError::ModuleNotFoundError {
                module: module_name.to_string(),
                path: path.to_string(),
            }
        })
    }

    fn to_json(&self, value: &PyValue) -> Result<Vec<u8>> {
        let json = if self.config.pretty() {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json.into_bytes())
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for SdkExportPipeline<S, C> {
    fn extract(&self) -> Result<SdkModules> {
        let profile = self.resolve(PROFILE_MODULE)?;
        if !profile.contains(PROFILE_OBJECT) {
            return Err(ExportError::MissingObjectError {
                module: PROFILE_MODULE.to_string(),
                name: PROFILE_OBJECT.to_string(),
            });
        }

        // fit 模組必須在任何寫入之前解析成功
        let fit = self.resolve(FIT_MODULE)?;

        Ok(SdkModules { profile, fit })
    }

    fn transform(&self, mut modules: SdkModules) -> Result<ExportPlan> {
        let profile =
            modules
                .profile
                .take(PROFILE_OBJECT)
                .ok_or_else(|| ExportError::MissingObjectError {
                    module: PROFILE_MODULE.to_string(),
                    name: PROFILE_OBJECT.to_string(),
                })?;

        let tables: Vec<FitTable> = FIT_EXPORT_TABLES
            .iter()
            .map(|&(name, filename)| FitTable {
                name,
                filename,
                value: modules.fit.take(name),
            })
            .collect();

        if tables.iter().all(|table| table.value.is_none()) {
            return Err(ExportError::EmptyExtractionError {
                module: FIT_MODULE.to_string(),
            });
        }

        Ok(ExportPlan { profile, tables })
    }

    fn load(&self, plan: ExportPlan) -> Result<String> {
        let output_path = self.config.output_path().to_string();

        // profile.json 為必要輸出，失敗立即中止
        let data = self.to_json(&plan.profile)?;
        self.storage.write_file(PROFILE_FILENAME, &data)?;
        tracing::info!("💾 Wrote profile data to {}/{}", output_path, PROFILE_FILENAME);

        let mut failures: Vec<&str> = Vec::new();
        for table in &plan.tables {
            let value = match &table.value {
                Some(value) => value,
                None => {
                    tracing::warn!("⚠️ Could not find data for {}", table.filename);
                    continue;
                }
            };
            match self
                .to_json(value)
                .and_then(|data| self.storage.write_file(table.filename, &data))
            {
                Ok(()) => {
                    tracing::info!(
                        "💾 Wrote {} to {}/{}",
                        table.name,
                        output_path,
                        table.filename
                    );
                }
                Err(e) => {
                    tracing::error!("❌ Failed to write {}: {}", table.filename, e);
                    failures.push(table.filename);
                }
            }
        }

        if !failures.is_empty() {
            return Err(ExportError::ProcessingError {
                message: format!("failed to write {}", failures.join(", ")),
            });
        }

        Ok(output_path)
    }
}
