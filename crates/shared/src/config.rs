//! Engine configuration management.

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::types::Currency;

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Settlement configuration.
    #[serde(default)]
    pub settlement: SettlementConfig,
    /// Balance aggregation configuration.
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Currency used when rendering amounts for display.
    #[serde(default)]
    pub currency: Currency,
}

/// Settlement configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettlementConfig {
    /// Tolerance in minor units: a balance `x` counts as settled when `|x| < epsilon_units`.
    #[serde(default = "default_epsilon_units")]
    pub epsilon_units: i64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            epsilon_units: default_epsilon_units(),
        }
    }
}

fn default_epsilon_units() -> i64 {
    1
}

/// Balance aggregation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggregationConfig {
    /// Expense count at which aggregation folds expenses in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_parallel_threshold() -> usize {
    512
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// then `TALLY__*` environment variables (e.g. `TALLY__SETTLEMENT__EPSILON_UNITS`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the offending key.
    pub fn validate(&self) -> AppResult<()> {
        if self.settlement.epsilon_units < 1 {
            return Err(AppError::Config(format!(
                "settlement.epsilon_units must be at least 1, got {}",
                self.settlement.epsilon_units
            )));
        }
        if self.aggregation.parallel_threshold == 0 {
            return Err(AppError::Config(
                "aggregation.parallel_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
