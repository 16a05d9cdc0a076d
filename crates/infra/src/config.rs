//! Settings loading.

use serde::Deserialize;

use stockval_core::Currency;
use stockval_observability::LogSettings;

use crate::error::ServiceResult;

fn environment() -> config::Environment {
    config::Environment::with_prefix("STOCKVAL").separator("__")
}

/// Service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub currency: CurrencySettings,
    #[serde(default)]
    pub sequence: SequenceSettings,
    #[serde(default)]
    pub log: LogSettings,
}

/// Company currency used for rounding and zero tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencySettings {
    #[serde(default = "default_currency_code")]
    pub code: String,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            code: default_currency_code(),
            decimal_places: default_decimal_places(),
        }
    }
}

impl CurrencySettings {
    pub fn currency(&self) -> Currency {
        Currency::new(self.code.clone(), self.decimal_places)
    }
}

/// Revaluation reference numbering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SequenceSettings {
    #[serde(default = "default_revaluation_prefix")]
    pub revaluation_prefix: String,
    #[serde(default = "default_padding")]
    pub padding: usize,
}

fn default_revaluation_prefix() -> String {
    "REV/".to_string()
}

fn default_padding() -> usize {
    5
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            revaluation_prefix: default_revaluation_prefix(),
            padding: default_padding(),
        }
    }
}

impl Settings {
    /// Load from `config/default` (optional) then `STOCKVAL__*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`](crate::ServiceError::Config) if a source cannot be read or a value
    /// has the wrong type.
    pub fn load() -> ServiceResult<Self> {
        Self::load_from(environment())
    }

    fn load_from(env: config::Environment) -> ServiceResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Install the process-wide subscriber described by the `log` section.
    pub fn init_logging(&self) {
        stockval_observability::tracing::init(&self.log);
    }
}
