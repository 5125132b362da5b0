use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a pipeline through its three phases and reports progress.
pub struct ExportEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ExportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn run(&self) -> Result<String> {
        println!("Starting FIT SDK export...");

        // Extract
        println!("Loading SDK modules...");
        let modules = self.pipeline.extract()?;
        println!(
            "Loaded {} binding(s) from {}, {} binding(s) from {}",
            modules.profile.len(),
            modules.profile.name(),
            modules.fit.len(),
            modules.fit.name()
        );
        self.monitor.log_stats("Extract");

        // Transform
        println!("Collecting data objects...");
        let plan = self.pipeline.transform(modules)?;
        println!("Collected {} object(s)", plan.object_count());
        self.monitor.log_stats("Transform");

        // Load
        println!("Writing JSON files...");
        let output_path = self.pipeline.load(plan)?;
        println!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExportPlan, PyValue, SdkModules, SourceModule};
    use crate::utils::error::ExportError;
    use std::collections::HashMap;

    struct MockPipeline {
        fail_extract: bool,
    }

    impl Pipeline for MockPipeline {
        fn extract(&self) -> Result<SdkModules> {
            if self.fail_extract {
                return Err(ExportError::ModuleNotFoundError {
                    module: "profile".to_string(),
                    path: "/missing".to_string(),
                });
            }
            let mut bindings = HashMap::new();
            bindings.insert("Profile".to_string(), PyValue::Int(1));
            Ok(SdkModules {
                profile: SourceModule::new("profile", "/tmp/profile.py", bindings),
                fit: SourceModule::new("fit", "/tmp/fit.py", HashMap::new()),
            })
        }

        fn transform(&self, mut modules: SdkModules) -> Result<ExportPlan> {
            Ok(ExportPlan {
                profile: modules.profile.take("Profile").unwrap_or(PyValue::None),
                tables: Vec::new(),
            })
        }

        fn load(&self, _plan: ExportPlan) -> Result<String> {
            Ok("mock_output".to_string())
        }
    }

    #[test]
    fn test_run_drives_all_phases() {
        let engine = ExportEngine::new(MockPipeline { fail_extract: false });
        assert_eq!(engine.run().unwrap(), "mock_output");
    }

    #[test]
    fn test_run_propagates_extract_failure() {
        let engine = ExportEngine::new_with_monitoring(MockPipeline { fail_extract: true }, false);
        assert!(matches!(
            engine.run(),
            Err(ExportError::ModuleNotFoundError { .. })
        ));
    }
}
