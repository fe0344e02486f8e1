use crate::domain::model::{RenderedMap, SupplierRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Writes `data` to `path` relative to the storage root, replacing any
    /// existing content.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait SupplierSource: Send + Sync {
    async fn fetch_suppliers(&self) -> Result<Vec<SupplierRecord>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SupplierRecord>>;
    async fn transform(&self, data: Vec<SupplierRecord>) -> Result<RenderedMap>;
    async fn load(&self, result: RenderedMap) -> Result<String>;
}
