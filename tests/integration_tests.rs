use httpmock::prelude::*;
use supplier_map::core::markers::distinct_service_names;
use supplier_map::{
    EtlEngine, LocalStorage, MapError, MapPipeline, MapSettings, RunOutcome, SupabaseClient,
    SupabaseConfig, SupplierRecord,
};
use tempfile::TempDir;

const VIEW_PATH: &str = "/rest/v1/view_fornecedores_servicos_ativos";

fn settings_in(temp_dir: &TempDir) -> MapSettings {
    let mut settings = MapSettings::default();
    settings.output.directory = temp_dir
        .path()
        .join("docs")
        .to_str()
        .unwrap()
        .to_string();
    settings
}

fn engine_for(
    server: &MockServer,
    settings: MapSettings,
) -> EtlEngine<MapPipeline<LocalStorage, SupabaseClient>> {
    let credentials = SupabaseConfig {
        url: server.base_url(),
        key: "anon-key".to_string(),
    };
    let source = SupabaseClient::new(credentials, &settings.source).unwrap();
    let storage = LocalStorage::new(settings.output.directory.clone());
    EtlEngine::new(MapPipeline::new(storage, source, settings))
}

fn embedded_data(html: &str) -> Vec<serde_json::Value> {
    let start = html.find("var fornecedores = ").unwrap() + "var fornecedores = ".len();
    let end = start + html[start..].find(";\n").unwrap();
    serde_json::from_str(&html[start..end]).unwrap()
}

#[tokio::test]
async fn test_end_to_end_single_supplier_map() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_in(&temp_dir);
    let output_file = settings.output_file_path();

    // The NO_COORDS row is removed by the query predicate, so the view only
    // answers with the mappable supplier.
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path(VIEW_PATH)
            .query_param_exists("select")
            .header("apikey", "anon-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {
                    "id_fornecedor": 1,
                    "nome": "Lab A",
                    "cidade": "São Paulo",
                    "estado": "SP",
                    "endereco_latitude": "-23.5",
                    "endereco_longitude": "-46.6",
                    "servicos": [
                        {"servico": "Hemograma", "valor_a_pagar": 10, "valor_a_cobrar": 20}
                    ]
                }
            ]));
    });

    let outcome = engine_for(&server, settings).run().await.unwrap();

    api_mock.assert();
    assert_eq!(
        outcome,
        RunOutcome::Written {
            path: output_file.display().to_string(),
            markers: 1
        }
    );

    let html = std::fs::read_to_string(&output_file).unwrap();
    let data = embedded_data(&html);
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["nome"], "Lab A");
    assert_eq!(data[0]["servicos"][0]["servico"], "Hemograma");

    let records: Vec<SupplierRecord> =
        serde_json::from_value(serde_json::Value::Array(data)).unwrap();
    assert_eq!(distinct_service_names(&records), vec!["Hemograma"]);
    assert!(html.contains(r#"<span id="resultCount">1</span>"#));
    assert!(html.contains("Pagar: R$ 10,00 | Cobrar: R$ 20,00"));
}

#[tokio::test]
async fn test_unparseable_coordinates_stay_in_embedded_data() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_in(&temp_dir);
    let output_file = settings.output_file_path();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(VIEW_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"id_fornecedor": 1, "nome": "Lab A", "endereco_latitude": "-8.05", "endereco_longitude": "-34.9", "servicos": []},
                {"id_fornecedor": 2, "nome": "Lab B", "endereco_latitude": "rua sem número", "endereco_longitude": "-34.9", "servicos": null}
            ]));
    });

    let outcome = engine_for(&server, settings).run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Written { markers: 1, .. }));
    let html = std::fs::read_to_string(&output_file).unwrap();
    let names: Vec<String> = embedded_data(&html)
        .iter()
        .map(|row| row["nome"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Lab A", "Lab B"]);
    assert_eq!(html.matches("<li>").count(), 1);
}

#[tokio::test]
async fn test_empty_result_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_in(&temp_dir);
    let output_dir = std::path::PathBuf::from(&settings.output.directory);

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path(VIEW_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });

    let outcome = engine_for(&server, settings).run().await.unwrap();

    api_mock.assert();
    assert_eq!(outcome, RunOutcome::NoData);
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_fetch_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_in(&temp_dir);
    let output_file = settings.output_file_path();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path(VIEW_PATH);
        then.status(500).body("upstream unavailable");
    });

    let err = engine_for(&server, settings).run().await.unwrap_err();

    api_mock.assert();
    assert!(matches!(err, MapError::QueryError { status: 500, .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!output_file.exists());
}

#[tokio::test]
async fn test_existing_page_is_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_in(&temp_dir);
    let output_file = settings.output_file_path();
    std::fs::create_dir_all(output_file.parent().unwrap()).unwrap();
    std::fs::write(&output_file, "stale page").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(VIEW_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"id_fornecedor": 3, "nome": "Lab C", "endereco_latitude": "-15.8", "endereco_longitude": "-47.9"}
            ]));
    });

    engine_for(&server, settings).run().await.unwrap();

    let html = std::fs::read_to_string(&output_file).unwrap();
    assert!(!html.contains("stale page"));
    assert!(html.contains("Lab C"));
}

#[cfg(feature = "cli")]
#[test]
fn test_missing_key_aborts_before_any_request() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("docs");

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path(VIEW_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"id_fornecedor": 1, "nome": "Lab A", "endereco_latitude": "-8.05", "endereco_longitude": "-34.9"}
            ]));
    });

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_supplier-map"))
        .env_clear()
        .env("SUPABASE_URL", server.base_url())
        .arg("--output-dir")
        .arg(&output_dir)
        .current_dir(temp_dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SUPABASE_KEY"));
    assert_eq!(api_mock.hits(), 0);
    assert!(!output_dir.exists());
}
