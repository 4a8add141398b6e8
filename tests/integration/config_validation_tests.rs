//! Configuration loading and validation integration tests
//!
//! These tests verify that configuration files load with defaults filled in
//! and fail appropriately for invalid values.

#[cfg(test)]
mod tests {
    use fhir_import_batcher::config::{Config, ImporterConfig, Validate};
    use fhir_import_batcher::ImporterError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    fn expect_config_error(result: Result<Config, ImporterError>, needle: &str) {
        match result {
            Err(ImporterError::Config(message)) => {
                assert!(message.contains(needle), "{:?} lacks {:?}", message, needle)
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    // ==================== File Loading ====================

    #[tokio::test]
    async fn test_load_full_config_file() {
        let file = write_config(
            r#"
server:
  host: 127.0.0.1
  port: 9090
  workers: 2
storage:
  database:
    url: "sqlite::memory:"
    max_connections: 1
batching:
  max_batch_size: 5000
  suggested_min_file_size: 100
  reject_oversized_files: true
import_api:
  base_url: https://fhir.example.com/r4
  storage_base_url: https://storage.example.com/ndjson
  mode: InitialLoad
reconciler:
  poll_interval: 15
  concurrency: 8
logging:
  level: debug
  json: true
"#,
        );

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.server().address(), "127.0.0.1:9090");
        assert_eq!(config.server().workers, Some(2));
        assert!(config.storage().database.is_in_memory());
        assert_eq!(config.batching().max_batch_size, 5000);
        assert!(config.batching().reject_oversized_files);
        assert_eq!(config.import_api().mode, "InitialLoad");
        assert_eq!(config.import_api().endpoint_path, "$import");
        assert_eq!(config.reconciler().poll_interval().as_secs(), 15);
        assert_eq!(config.reconciler().concurrency, 8);
        assert!(config.reconciler().enabled);
        assert!(config.logging().json);
    }

    #[tokio::test]
    async fn test_minimal_config_uses_defaults() {
        let file = write_config("batching:\n  max_batch_size: 10\n");

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.batching().max_batch_size, 10);
        assert_eq!(config.server().port, 8080);
        assert_eq!(config.import_api().input_format, "application/fhir+ndjson");
        assert_eq!(config.reconciler().poll_interval().as_secs(), 60);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(dir.path().join("absent.yaml")).await;
        expect_config_error(result, "read");
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_an_error() {
        let file = write_config("server: [not, a, mapping");
        let result = Config::from_file(file.path()).await;
        expect_config_error(result, "parse");
    }

    #[tokio::test]
    async fn test_invalid_values_rejected_on_load() {
        let file = write_config("batching:\n  max_batch_size: 0\n");
        let result = Config::from_file(file.path()).await;
        expect_config_error(result, "batch size");
    }

    #[test]
    fn test_yaml_round_trip_omits_token() {
        let mut config = Config::default();
        config.importer.import_api.bearer_token = Some("secret".to_string());

        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("secret"));

        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.batching().max_batch_size, config.batching().max_batch_size);
        assert!(parsed.import_api().bearer_token.is_none());
    }

    // ==================== Validation ====================

    #[test]
    fn test_default_config_is_valid() {
        assert!(ImporterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_import_base_url_must_be_http() {
        let mut config = ImporterConfig::default();
        config.import_api.base_url = "ftp://fhir.example.com".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().contains("http"));
    }

    #[test]
    fn test_storage_base_url_required() {
        let mut config = ImporterConfig::default();
        config.import_api.storage_base_url = String::new();

        let result = config.validate();
        assert!(result.unwrap_err().contains("Storage base URL"));
    }

    #[test]
    fn test_reconciler_concurrency_zero() {
        let mut config = ImporterConfig::default();
        config.reconciler.concurrency = 0;

        let result = config.validate();
        assert!(result.unwrap_err().contains("concurrency"));
    }

    #[test]
    fn test_unsupported_database_rejected() {
        let mut config = ImporterConfig::default();
        config.storage.database.url = "mysql://localhost/importer".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().contains("SQLite"));
    }

    // ==================== Environment Overrides ====================

    #[test]
    fn test_env_overrides_applied() {
        let mut config = ImporterConfig::default();
        config
            .apply_env_overrides(|key| match key {
                "IMPORTER_PORT" => Some("9999".to_string()),
                "IMPORTER_MAX_BATCH_SIZE" => Some("42".to_string()),
                "DATABASE_URL" => Some("sqlite::memory:".to_string()),
                "IMPORTER_API_TOKEN" => Some("token".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.batching.max_batch_size, 42);
        assert!(config.storage.database.is_in_memory());
        assert_eq!(config.import_api.bearer_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_env_override_parse_failure() {
        let mut config = ImporterConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "IMPORTER_POLL_INTERVAL").then(|| "soon".to_string())
        });
        match result {
            Err(ImporterError::Config(message)) => {
                assert!(message.contains("IMPORTER_POLL_INTERVAL"))
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
