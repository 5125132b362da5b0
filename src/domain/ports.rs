use crate::domain::model::{ExportPlan, SdkModules};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn sdk_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn pretty(&self) -> bool;
}

pub trait Pipeline: Send + Sync {
    fn extract(&self) -> Result<SdkModules>;
    fn transform(&self, modules: SdkModules) -> Result<ExportPlan>;
    fn load(&self, plan: ExportPlan) -> Result<String>;
}
