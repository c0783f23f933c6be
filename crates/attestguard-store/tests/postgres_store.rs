// crates/attestguard-store/tests/postgres_store.rs
// ============================================================================
// Module: Postgres Store Tests
// Description: Config-shape and connection-failure tests without a live database.
// Purpose: Validate error handling the same way the teacher's store tests do.
// ============================================================================

use attestguard_store::PostgresStore;
use attestguard_store::PostgresStoreConfig;

#[test]
fn postgres_store_default_config_is_valid_shape() {
    let config = PostgresStoreConfig::default();
    assert!(!config.connection.is_empty());
    assert!(config.max_connections > 0);
    assert!(config.connect_timeout_ms > 0);
    assert!(config.statement_timeout_ms > 0);
}

#[test]
fn postgres_store_invalid_connection_string_fails() {
    let config = PostgresStoreConfig {
        connection: "not-a-url".to_string(),
        max_connections: 1,
        connect_timeout_ms: 1,
        statement_timeout_ms: 1,
    };
    let result = PostgresStore::new(&config);
    assert!(result.is_err());
}

#[test]
fn postgres_store_config_serde_roundtrip() {
    let original = PostgresStoreConfig::default();
    let json = serde_json::to_string(&original).expect("serialize");
    let restored: PostgresStoreConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(original.connection, restored.connection);
    assert_eq!(original.max_connections, restored.max_connections);
    assert_eq!(original.connect_timeout_ms, restored.connect_timeout_ms);
    assert_eq!(original.statement_timeout_ms, restored.statement_timeout_ms);
}
