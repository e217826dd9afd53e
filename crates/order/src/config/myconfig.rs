use anyhow::{Context, Result, anyhow};

pub const DEFAULT_OTEL_ENDPOINT: &str = "http://otel-collector:4317";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub run_migrations: bool,
    pub port: u16,
    pub db_max_conn: u32,
    pub db_min_conn: u32,
    pub batch_fetch_size: usize,
    pub otel_endpoint: String,
    pub is_dev: bool,
    pub enable_file_log: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source, `std::env` in
    /// production.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).with_context(|| format!("Missing environment variable: {key}"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let database_url = required("DATABASE_URL")?;
        let run_migrations_str = required("RUN_MIGRATIONS")?;
        let port_str = required("PORT")?;

        let run_migrations = match run_migrations_str.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let port = port_str
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let db_max_conn: u32 = or_default("DB_MAX_CONNECTION", "5")
            .parse::<u32>()
            .context("Unable to parse DB_MAX_CONNECTION as u32")?;

        let db_min_conn: u32 = or_default("DB_MIN_CONNECTION", "1")
            .parse::<u32>()
            .context("Unable to parse DB_MIN_CONNECTION as u32")?;

        let batch_fetch_size: usize = or_default("ORDER_BATCH_FETCH_SIZE", "100")
            .parse::<usize>()
            .context("Unable to parse ORDER_BATCH_FETCH_SIZE as usize")?;

        if !(1..=1000).contains(&batch_fetch_size) {
            return Err(anyhow!(
                "ORDER_BATCH_FETCH_SIZE must be between 1 and 1000, got {}",
                batch_fetch_size
            ));
        }

        let otel_endpoint = or_default("OTEL_ENDPOINT", DEFAULT_OTEL_ENDPOINT);

        let is_dev = lookup("DEV_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let enable_file_log = lookup("ENABLE_FILE_LOG")
            .map(|v| v == "true")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            run_migrations,
            port,
            db_max_conn,
            db_min_conn,
            batch_fetch_size,
            otel_endpoint,
            is_dev,
            enable_file_log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/shop"),
        ("RUN_MIGRATIONS", "false"),
        ("PORT", "8080"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();

        assert_eq!(config.port, 8080);
        assert!(!config.run_migrations);
        assert_eq!(config.db_max_conn, 5);
        assert_eq!(config.db_min_conn, 1);
        assert_eq!(config.batch_fetch_size, 100);
        assert_eq!(config.otel_endpoint, DEFAULT_OTEL_ENDPOINT);
        assert!(!config.is_dev);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = Config::from_lookup(lookup(&BASE[1..])).unwrap_err();

        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn run_migrations_accepts_only_true_or_false() {
        let mut pairs = BASE.to_vec();
        pairs[1] = ("RUN_MIGRATIONS", "yes");

        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn batch_fetch_size_is_bounded() {
        for (value, ok) in [("0", false), ("1", true), ("1000", true), ("1001", false)] {
            let mut pairs = BASE.to_vec();
            pairs.push(("ORDER_BATCH_FETCH_SIZE", value));

            assert_eq!(Config::from_lookup(lookup(&pairs)).is_ok(), ok, "{value}");
        }
    }
}
