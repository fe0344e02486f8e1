//! Read access to the supplier view through the Supabase REST (PostgREST)
//! interface.

use crate::config::settings::SourceSettings;
use crate::config::SupabaseConfig;
use crate::domain::model::SupplierRecord;
use crate::domain::ports::SupplierSource;
use crate::utils::error::{MapError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

pub const SELECT_COLUMNS: &str =
    "id_fornecedor,nome,cidade,estado,endereco_latitude,endereco_longitude,servicos";
const LATITUDE_COLUMN: &str = "endereco_latitude";

pub struct SupabaseClient {
    client: Client,
    config: SupabaseConfig,
    view: String,
    no_coordinates_sentinel: String,
}

/// Error body PostgREST returns with non-2xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig, source: &SourceSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("supplier-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config,
            view: source.view.clone(),
            no_coordinates_sentinel: source.no_coordinates_sentinel.clone(),
        })
    }

    /// `{base}/rest/v1/{view}` with the column list and both coordinate
    /// predicates. A path on the base URL (e.g. behind a proxy) is kept.
    pub fn query_url(&self) -> Result<Url> {
        let mut base = Url::parse(&self.config.url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut url = base.join("rest/v1/")?.join(&self.view)?;
        url.query_pairs_mut()
            .append_pair("select", SELECT_COLUMNS)
            .append_pair(LATITUDE_COLUMN, "not.is.null")
            .append_pair(
                LATITUDE_COLUMN,
                &format!("neq.{}", self.no_coordinates_sentinel),
            );
        Ok(url)
    }
}

#[async_trait]
impl SupplierSource for SupabaseClient {
    async fn fetch_suppliers(&self) -> Result<Vec<SupplierRecord>> {
        let url = self.query_url()?;
        tracing::debug!("Querying supplier view: {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Supplier view response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapError::QueryError {
                status: status.as_u16(),
                message: describe_error_body(&body, status.canonical_reason()),
            });
        }

        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(decode_rows(rows))
    }
}

fn describe_error_body(body: &str, reason: Option<&str>) -> String {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(PostgrestError {
            message: Some(message),
            details,
            hint,
        }) => {
            let mut text = message;
            for extra in [details, hint].into_iter().flatten() {
                text.push_str(" (");
                text.push_str(&extra);
                text.push(')');
            }
            text
        }
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => reason.unwrap_or("no response body").to_string(),
    }
}

/// Decodes each row independently. Rows that do not have the supplier shape
/// are dropped with one warning for the whole batch.
pub fn decode_rows(rows: Vec<serde_json::Value>) -> Vec<SupplierRecord> {
    let total = rows.len();
    let mut first_error = None;
    let records: Vec<SupplierRecord> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                first_error.get_or_insert(e);
                None
            }
        })
        .collect();

    if let Some(e) = first_error {
        tracing::warn!(
            "⚠️ Dropped {} of {} supplier rows with an unexpected shape (first: {})",
            total - records.len(),
            total,
            e
        );
    }
    records
}
