//! Application configuration management.

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
    /// Finance engine configuration.
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Logging configuration. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Fallback `EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "finledger=debug,finledger_core=debug,finledger_api=debug,tower_http=debug".to_string()
}

/// Finance engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Functional currency of the ledger.
    #[serde(default)]
    pub currency: Currency,
    /// Upper bound on waiting for an aggregate lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// First month (1-12) of the fiscal year.
    #[serde(default = "default_fiscal_year_start_month")]
    pub fiscal_year_start_month: u32,
    /// Seed the default chart of accounts on startup.
    #[serde(default = "default_true")]
    pub seed_default_chart: bool,
    /// Account codes used for system-generated postings.
    #[serde(default)]
    pub posting: PostingAccountCodes,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            lock_timeout_ms: default_lock_timeout_ms(),
            fiscal_year_start_month: default_fiscal_year_start_month(),
            seed_default_chart: true,
            posting: PostingAccountCodes::default(),
        }
    }
}

fn default_lock_timeout_ms() -> u64 {
    2000
}

fn default_fiscal_year_start_month() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Account codes the engine posts to on invoice, payment and expense transitions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostingAccountCodes {
    /// Trade receivables (sales invoices).
    pub receivable: String,
    /// Trade payables (purchase invoices).
    pub payable: String,
    /// Default revenue account for sales lines.
    pub sales_revenue: String,
    /// Default cost account for purchase lines.
    pub purchases: String,
    /// VAT collected on sales.
    pub output_tax: String,
    /// VAT paid on purchases.
    pub input_tax: String,
    /// Liability recognised when an expense is approved.
    pub accrued_expenses: String,
    /// Cash account used when a caller does not name one.
    pub default_cash: String,
    /// Income tax withheld from employees and suppliers, owed to the state.
    pub withholding_tax: String,
    /// Income tax instalments paid ahead of the annual return.
    pub prepaid_income_tax: String,
}

impl Default for PostingAccountCodes {
    fn default() -> Self {
        Self {
            receivable: "1130".to_string(),
            payable: "2110".to_string(),
            sales_revenue: "4100".to_string(),
            purchases: "5100".to_string(),
            output_tax: "2130".to_string(),
            input_tax: "1140".to_string(),
            accrued_expenses: "2120".to_string(),
            default_cash: "1120".to_string(),
            withholding_tax: "2140".to_string(),
            prepaid_income_tax: "1150".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FINLEDGER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(
            [
                ("FINLEDGER__JWT__SECRET", Some("test-secret")),
                ("FINLEDGER__ENGINE__LOCK_TIMEOUT_MS", None::<&str>),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.jwt.secret, "test-secret");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.engine.currency, Currency::Idr);
                assert_eq!(config.engine.lock_timeout_ms, 2000);
                assert_eq!(config.engine.fiscal_year_start_month, 1);
                assert!(config.engine.seed_default_chart);
                assert_eq!(config.engine.posting, PostingAccountCodes::default());
                assert!(!config.log.json);
            },
        );
    }

    #[test]
    fn test_environment_overrides_engine_settings() {
        temp_env::with_vars(
            [
                ("FINLEDGER__JWT__SECRET", Some("test-secret")),
                ("FINLEDGER__ENGINE__LOCK_TIMEOUT_MS", Some("250")),
                ("FINLEDGER__ENGINE__FISCAL_YEAR_START_MONTH", Some("4")),
                ("FINLEDGER__SERVER__PORT", Some("9090")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.engine.lock_timeout_ms, 250);
                assert_eq!(config.engine.fiscal_year_start_month, 4);
                assert_eq!(config.server.port, 9090);
            },
        );
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        temp_env::with_vars(
            [
                ("FINLEDGER__JWT__SECRET", None::<&str>),
                ("RUN_MODE", Some("test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
