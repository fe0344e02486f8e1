use crate::config::settings::MapSettings;
use crate::core::markers::{build_markers, distinct_service_names};
use crate::core::render::render_page;
use crate::domain::model::{RenderedMap, SupplierRecord};
use crate::domain::ports::{Pipeline, Storage, SupplierSource};
use crate::utils::error::Result;
use chrono::Utc;

/// Fetch suppliers from `source`, render the map page, write it to `storage`.
pub struct MapPipeline<S: Storage, F: SupplierSource> {
    pub(crate) storage: S,
    pub(crate) source: F,
    pub(crate) settings: MapSettings,
}

impl<S: Storage, F: SupplierSource> MapPipeline<S, F> {
    pub fn new(storage: S, source: F, settings: MapSettings) -> Self {
        Self {
            storage,
            source,
            settings,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: SupplierSource> Pipeline for MapPipeline<S, F> {
    async fn extract(&self) -> Result<Vec<SupplierRecord>> {
        self.source.fetch_suppliers().await
    }

    async fn transform(&self, data: Vec<SupplierRecord>) -> Result<RenderedMap> {
        let markers = build_markers(&data);
        let service_names = distinct_service_names(&data);
        tracing::debug!("Service filter options: {:?}", service_names);

        let html = render_page(&data, &markers, &self.settings.map, Utc::now())?;

        Ok(RenderedMap {
            html,
            record_count: data.len(),
            marker_count: markers.len(),
            service_names,
        })
    }

    async fn load(&self, result: RenderedMap) -> Result<String> {
        let file_name = &self.settings.output.file_name;
        tracing::debug!("Writing map page ({} bytes)", result.html.len());
        self.storage
            .write_file(file_name, result.html.as_bytes())
            .await?;
        Ok(self.settings.output_file_path().display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ServiceOffering, SupplierId};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct StaticSource(Vec<SupplierRecord>);

    #[async_trait::async_trait]
    impl SupplierSource for StaticSource {
        async fn fetch_suppliers(&self) -> Result<Vec<SupplierRecord>> {
            Ok(self.0.clone())
        }
    }

    fn record(id: i64, lat: &str, services: &[&str]) -> SupplierRecord {
        SupplierRecord {
            id: SupplierId::Int(id),
            name: format!("Fornecedor {}", id),
            city: None,
            state: None,
            latitude: Some(lat.into()),
            longitude: Some("-46.6".into()),
            services: services
                .iter()
                .map(|s| ServiceOffering {
                    service: Some(s.to_string()),
                    amount_payable: None,
                    amount_chargeable: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_transform_counts_markers_and_services() {
        let pipeline = MapPipeline::new(
            MockStorage::default(),
            StaticSource(vec![]),
            MapSettings::default(),
        );
        let records = vec![
            record(1, "-23.5", &["Hemograma", "Glicose"]),
            record(2, "NaN", &["Glicose", "TSH"]),
        ];

        let rendered = pipeline.transform(records).await.unwrap();

        assert_eq!(rendered.record_count, 2);
        assert_eq!(rendered.marker_count, 1);
        assert_eq!(rendered.service_names, vec!["Glicose", "Hemograma", "TSH"]);
        assert!(rendered.html.contains("Fornecedor 2"));
    }

    #[tokio::test]
    async fn test_load_writes_configured_file_name() {
        let storage = MockStorage::default();
        let mut settings = MapSettings::default();
        settings.output.directory = "public".to_string();
        settings.output.file_name = "mapa.html".to_string();
        let pipeline = MapPipeline::new(storage.clone(), StaticSource(vec![]), settings);

        let rendered = pipeline.transform(vec![record(1, "-23.5", &[])]).await.unwrap();
        let path = pipeline.load(rendered).await.unwrap();

        assert_eq!(path, std::path::Path::new("public").join("mapa.html").display().to_string());
        let written = storage.get_file("mapa.html").await.unwrap();
        assert!(String::from_utf8(written).unwrap().contains("Fornecedor 1"));
    }

    #[tokio::test]
    async fn test_extract_delegates_to_source() {
        let pipeline = MapPipeline::new(
            MockStorage::default(),
            StaticSource(vec![record(7, "1", &[])]),
            MapSettings::default(),
        );
        let records = pipeline.extract().await.unwrap();
        assert_eq!(records[0].id, SupplierId::Int(7));
    }
}
