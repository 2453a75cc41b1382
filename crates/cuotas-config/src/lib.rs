//! Configuration management for cuotas
//!
//! This module handles loading, validation, and management of
//! cuotas configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigErrorCode, ConfigErrorDetails, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
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
    8081
}

/// Which ledger store backend holds the purchase rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Local CSV file with a header row
    Csv,
    /// In-process table, lost on exit
    Memory,
    /// Google Sheets API v4
    Sheets,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Csv
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(StoreBackend::Csv),
            "memory" => Ok(StoreBackend::Memory),
            "sheets" => Ok(StoreBackend::Sheets),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Csv => write!(f, "csv"),
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Sheets => write!(f, "sheets"),
        }
    }
}

/// Google Sheets connection settings
///
/// The access token is obtained elsewhere (service account flow, gcloud,
/// ...) and handed over either inline or through an environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet ID from the document URL
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Tab name used in A1 ranges
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Numeric tab ID (`gid`), needed to delete rows
    #[serde(default)]
    pub sheet_id: i64,
    /// Inline OAuth bearer token
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    /// Environment variable consulted when `access_token` is unset
    #[serde(default = "default_token_env")]
    pub access_token_env: String,
    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: default_sheet_name(),
            sheet_id: 0,
            access_token: None,
            access_token_env: default_token_env(),
            api_base: default_api_base(),
        }
    }
}

impl SheetsConfig {
    /// Resolve the bearer token, inline value first
    pub fn resolve_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(&self.access_token_env).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_token_env() -> String {
    "CUOTAS_SHEETS_TOKEN".to_string()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

/// Ledger store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: StoreBackend,
    /// CSV file used by the csv backend
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    /// Google Sheets settings, required for the sheets backend
    #[serde(default)]
    pub sheets: Option<SheetsConfig>,
    /// Write a fresh record ID into rows that lack one at startup
    #[serde(default = "default_true")]
    pub backfill_ids: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            csv_path: default_csv_path(),
            sheets: None,
            backfill_ids: true,
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("./data/cuotas.csv")
}

fn default_true() -> bool {
    true
}

/// Cards offered in the entry and edit forms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardsConfig {
    #[serde(default = "default_cards")]
    pub known: Vec<String>,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self { known: default_cards() }
    }
}

fn default_cards() -> Vec<String> {
    vec!["Naranja".to_string(), "Macro".to_string()]
}

/// Input validation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Apply the edit rules (paid <= count, merchant and date present)
    /// when a purchase is created
    #[serde(default = "default_true")]
    pub enforce_on_create: bool,
    /// Show a notice when stored values had to be replaced by fallbacks
    #[serde(default = "default_true")]
    pub warn_on_coercion: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_on_create: true,
            warn_on_coercion: true,
        }
    }
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
        }
    }
}

fn default_symbol() -> String {
    "$".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

/// Chart settings for the monthly summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_true")]
    pub show_legend: bool,
    #[serde(default = "default_bar_color")]
    pub bar_color: String,
    #[serde(default = "default_total_color")]
    pub total_color: String,
    #[serde(default = "default_paid_color")]
    pub paid_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            bar_color: default_bar_color(),
            total_color: default_total_color(),
            paid_color: default_paid_color(),
        }
    }
}

fn default_bar_color() -> String {
    "#6366F1".to_string()
}

fn default_total_color() -> String {
    "#F97316".to_string()
}

fn default_paid_color() -> String {
    "#10B981".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cards: CardsConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if self.cards.known.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cards.known".to_string(),
                reason: "At least one card must be listed".to_string(),
            });
        }

        if self.cards.known.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "cards.known".to_string(),
                reason: "Card names cannot be blank".to_string(),
            });
        }

        if self.store.backend == StoreBackend::Sheets {
            match &self.store.sheets {
                None => {
                    return Err(ConfigError::MissingField {
                        field: "store.sheets".to_string(),
                    })
                }
                Some(sheets) if sheets.spreadsheet_id.trim().is_empty() => {
                    return Err(ConfigError::MissingField {
                        field: "store.sheets.spreadsheet_id".to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = Config::from_yaml("{}").unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.store.backend, StoreBackend::Csv);
        assert_eq!(config.cards.known, vec!["Naranja", "Macro"]);
        assert!(config.validation.enforce_on_create);
        assert_eq!(config.currency.symbol, "$");
    }

    #[test]
    fn test_bundled_default_config_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Csv);
    }

    #[test]
    fn test_sheets_backend_requires_spreadsheet_id() {
        let yaml = "store:\n  backend: sheets\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::MissingField);

        let yaml = "store:\n  backend: sheets\n  sheets:\n    spreadsheet_id: ''\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("spreadsheet_id"));

        let yaml = "store:\n  backend: sheets\n  sheets:\n    spreadsheet_id: abc123\n";
        let config = Config::from_yaml(yaml).unwrap();
        let sheets = config.store.sheets.unwrap();
        assert_eq!(sheets.sheet_name, "Sheet1");
        assert_eq!(sheets.api_base, "https://sheets.googleapis.com");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidValue);
    }

    #[test]
    fn test_blank_card_rejected() {
        let err = Config::from_yaml("cards:\n  known: ['Naranja', ' ']\n").unwrap_err();
        assert!(err.to_string().contains("cards.known"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidYaml);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/definitely/not/here/config.yaml").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::FileNotFound);
    }

    #[test]
    fn test_inline_token_wins() {
        let sheets = SheetsConfig {
            access_token: Some("inline".to_string()),
            access_token_env: "CUOTAS_TEST_TOKEN_UNSET_VARIABLE".to_string(),
            ..SheetsConfig::default()
        };
        assert_eq!(sheets.resolve_token().as_deref(), Some("inline"));

        let sheets = SheetsConfig {
            access_token: None,
            access_token_env: "CUOTAS_TEST_TOKEN_UNSET_VARIABLE".to_string(),
            ..SheetsConfig::default()
        };
        assert_eq!(sheets.resolve_token(), None);
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("CSV".parse::<StoreBackend>().unwrap(), StoreBackend::Csv);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("sheets".parse::<StoreBackend>().unwrap(), StoreBackend::Sheets);
        assert!("excel".parse::<StoreBackend>().is_err());
    }
}
