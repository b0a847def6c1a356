use std::{env, net::IpAddr};

use dyndoc_core::storage::{CollectionSpec, StoreSettings, DEFAULT_THROUGHPUT};
use url::{Host, Url};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database holding the documents (default: "AzureFunctionTests")
    pub database_id: String,
    /// Collection holding the documents (default: "InventoryTestData")
    pub collection_id: String,
    /// Whether a newly created collection is partitioned (default: false)
    pub collection_partitioned: bool,
    /// Partition path used when the collection is partitioned (default: "/_partitionPath")
    pub partition_path: String,
    /// Throughput provisioned for a newly created collection (default: 400)
    pub collection_throughput: u32,
    /// Path to SQLite database file (default: "dyndoc.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Document store endpoint override (default: unset)
    /// Note: Only used when the `dynamodb` feature is enabled.
    #[allow(dead_code)]
    pub store_endpoint: Option<String>,
    /// AWS region (default: "us-east-1")
    /// Note: Only used when the `dynamodb` feature is enabled.
    #[allow(dead_code)]
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_ID` - Database id (default: "AzureFunctionTests")
    /// - `COLLECTION_ID` - Collection id (default: "InventoryTestData")
    /// - `COLLECTION_PARTITIONED` - "true"/"1" to partition new collections (default: false)
    /// - `PARTITION_PATH` - Partition path (default: "/_partitionPath")
    /// - `COLLECTION_THROUGHPUT` - Throughput for new collections (default: 400)
    /// - `SQLITE_PATH` - SQLite database path (default: "dyndoc.db")
    /// - `STORE_ENDPOINT` - Store endpoint URL (default: unset)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    pub fn from_env() -> Self {
        Self {
            database_id: env::var("DATABASE_ID")
                .unwrap_or_else(|_| "AzureFunctionTests".to_string()),
            collection_id: env::var("COLLECTION_ID")
                .unwrap_or_else(|_| "InventoryTestData".to_string()),
            collection_partitioned: env::var("COLLECTION_PARTITIONED")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            partition_path: env::var("PARTITION_PATH")
                .unwrap_or_else(|_| "/_partitionPath".to_string()),
            collection_throughput: env::var("COLLECTION_THROUGHPUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_THROUGHPUT),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "dyndoc.db".to_string()),
            store_endpoint: env::var("STORE_ENDPOINT").ok().filter(|v| !v.is_empty()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }

    /// Where the repository keeps its documents.
    pub fn store_settings(&self) -> StoreSettings {
        let mut collection =
            CollectionSpec::new(&self.collection_id).with_throughput(self.collection_throughput);
        if self.collection_partitioned {
            collection = collection.partitioned(&self.partition_path);
        }
        StoreSettings::new(&self.database_id, collection)
    }

    /// Whether the configured endpoint points at a local emulator.
    #[allow(dead_code)]
    pub fn uses_local_emulator(&self) -> bool {
        self.store_endpoint
            .as_deref()
            .is_some_and(is_loopback_endpoint)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Whether `endpoint` is a URL whose host is the local machine.
pub fn is_loopback_endpoint(endpoint: &str) -> bool {
    let Ok(url) = Url::parse(endpoint) else {
        return false;
    };
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_id: "db".to_string(),
            collection_id: "items".to_string(),
            collection_partitioned: false,
            partition_path: "/_partitionPath".to_string(),
            collection_throughput: 400,
            sqlite_path: "test.db".to_string(),
            store_endpoint: None,
            aws_region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_store_settings_unpartitioned() {
        let settings = test_config().store_settings();

        assert_eq!(settings.database_id, "db");
        assert_eq!(settings.collection, CollectionSpec::new("items"));
    }

    #[test]
    fn test_store_settings_partitioned() {
        let config = Config {
            collection_partitioned: true,
            collection_throughput: 1_000,
            ..test_config()
        };

        let settings = config.store_settings();

        assert_eq!(
            settings.collection.partition_path.as_deref(),
            Some("/_partitionPath")
        );
        assert_eq!(settings.collection.throughput, 1_000);
    }

    #[test]
    fn test_parse_flag() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(value), "{value:?} should be truthy");
        }
        for value in ["0", "false", "", "nope"] {
            assert!(!parse_flag(value), "{value:?} should be falsy");
        }
    }

    #[test]
    fn test_is_loopback_endpoint() {
        assert!(is_loopback_endpoint("https://localhost:8081"));
        assert!(is_loopback_endpoint("http://LOCALHOST:8000/"));
        assert!(is_loopback_endpoint("http://127.0.0.1:8000"));
        assert!(is_loopback_endpoint("http://[::1]:8000"));
        assert!(!is_loopback_endpoint("https://dynamodb.us-east-1.amazonaws.com"));
        assert!(!is_loopback_endpoint("http://10.0.0.5:8000"));
        assert!(!is_loopback_endpoint("not a url"));
    }

    #[test]
    fn test_uses_local_emulator() {
        let local = Config {
            store_endpoint: Some("http://localhost:8000".to_string()),
            ..test_config()
        };

        assert!(local.uses_local_emulator());
        assert!(!test_config().uses_local_emulator());
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        env::remove_var("DATABASE_ID");
        env::remove_var("COLLECTION_ID");
        env::remove_var("COLLECTION_PARTITIONED");
        env::remove_var("PARTITION_PATH");
        env::remove_var("COLLECTION_THROUGHPUT");
        env::remove_var("SQLITE_PATH");
        env::remove_var("STORE_ENDPOINT");
        env::remove_var("AWS_REGION");

        let config = Config::from_env();

        assert_eq!(config.database_id, "AzureFunctionTests");
        assert_eq!(config.collection_id, "InventoryTestData");
        assert!(!config.collection_partitioned);
        assert_eq!(config.partition_path, "/_partitionPath");
        assert_eq!(config.collection_throughput, 400);
        assert_eq!(config.sqlite_path, "dyndoc.db");
        assert_eq!(config.store_endpoint, None);
        assert_eq!(config.aws_region, "us-east-1");
    }
}
