//! TOML-based pipeline configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level pipeline configuration parsed from TOML.
///
/// All fields have defaults matching the baseline run. Load from TOML with
/// [`DispatchConfig::from_toml_file`] or use [`DispatchConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Input CSV file holding raw load observations.
    pub input: PathBuf,
    /// Output CSV file for the dispatched series.
    pub output: PathBuf,
    /// Generator parameters.
    pub generator: GeneratorConfig,
    /// Solver candidate order and per-attempt time budget.
    pub solver: SolverConfig,
    /// Column-name candidates for schema resolution.
    pub columns: ColumnConfig,
}

/// Generator parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Capacity upper bound (MW, must be > 0).
    pub capacity_mw: f64,
    /// Marginal cost (currency per MWh, must be >= 0).
    pub marginal_cost: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        // Capacity sits safely above national hourly peaks; the cost is a
        // thermal-plant placeholder.
        Self {
            capacity_mw: 85_000.0,
            marginal_cost: 50.0,
        }
    }
}

/// Solver candidate order and per-attempt time budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Candidate back-end identifiers, tried in order.
    pub order: Vec<String>,
    /// Time budget per solver attempt, in seconds (must be > 0).
    pub attempt_timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            order: vec!["microlp".to_string(), "clarabel".to_string()],
            attempt_timeout_secs: 120,
        }
    }
}

impl SolverConfig {
    /// The per-attempt budget as a [`Duration`].
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

/// Column-name candidates, resolved in list order with exact matches taking
/// priority over case-insensitive ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    /// Candidate names for the timestamp column.
    pub datetime: Vec<String>,
    /// Candidate names for the load column.
    pub load: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            datetime: vec![
                "datetime".to_string(),
                "time".to_string(),
                "timestamp".to_string(),
            ],
            load: vec![
                "load_MW".to_string(),
                "Load".to_string(),
                "load".to_string(),
                "quantity".to_string(),
                "value".to_string(),
            ],
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"generator.capacity_mw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} ({})", self.field, self.message)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl DispatchConfig {
    /// Returns the baseline configuration.
    pub fn baseline() -> Self {
        Self {
            input: PathBuf::from("load.csv"),
            output: PathBuf::from("dispatch_results.csv"),
            generator: GeneratorConfig::default(),
            solver: SolverConfig::default(),
            columns: ColumnConfig::default(),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let g = &self.generator;
        if !(g.capacity_mw.is_finite() && g.capacity_mw > 0.0) {
            errors.push(ConfigError {
                field: "generator.capacity_mw".to_string(),
                message: format!("must be a positive finite number, got {}", g.capacity_mw),
            });
        }
        if !(g.marginal_cost.is_finite() && g.marginal_cost >= 0.0) {
            errors.push(ConfigError {
                field: "generator.marginal_cost".to_string(),
                message: format!("must be a non-negative finite number, got {}", g.marginal_cost),
            });
        }

        let s = &self.solver;
        if s.order.is_empty() {
            errors.push(ConfigError {
                field: "solver.order".to_string(),
                message: "must name at least one candidate solver".to_string(),
            });
        }
        if s.attempt_timeout_secs == 0 {
            errors.push(ConfigError {
                field: "solver.attempt_timeout_secs".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        let c = &self.columns;
        if c.datetime.is_empty() {
            errors.push(ConfigError {
                field: "columns.datetime".to_string(),
                message: "must name at least one candidate column".to_string(),
            });
        }
        if c.load.is_empty() {
            errors.push(ConfigError {
                field: "columns.load".to_string(),
                message: "must name at least one candidate column".to_string(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_config_valid() {
        let cfg = DispatchConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn baseline_matches_reference_parameters() {
        let cfg = DispatchConfig::baseline();
        assert_eq!(cfg.generator.capacity_mw, 85_000.0);
        assert_eq!(cfg.generator.marginal_cost, 50.0);
        assert_eq!(cfg.solver.order, vec!["microlp", "clarabel"]);
        assert_eq!(cfg.solver.attempt_timeout_secs, 120);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
input = "germany_load.csv"
output = "results.csv"

[generator]
capacity_mw = 90000.0
marginal_cost = 42.5

[solver]
order = ["clarabel"]
attempt_timeout_secs = 30

[columns]
datetime = ["ts"]
load = ["mw"]
"#;
        let cfg = DispatchConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref().map(|c| c.generator.capacity_mw),
            Some(90_000.0)
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.solver.order.clone()),
            Some(vec!["clarabel".to_string()])
        );
        assert_eq!(
            cfg.as_ref().and_then(|c| c.input.to_str().map(String::from)),
            Some("germany_load.csv".to_string())
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[generator]
capacity_mw = 1000.0
bogus_field = true
"#;
        let result = DispatchConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[generator]
marginal_cost = 10.0
"#;
        let cfg = DispatchConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // marginal_cost overridden
        assert_eq!(cfg.as_ref().map(|c| c.generator.marginal_cost), Some(10.0));
        // capacity kept default
        assert_eq!(
            cfg.as_ref().map(|c| c.generator.capacity_mw),
            Some(85_000.0)
        );
        // solver order kept default
        assert_eq!(
            cfg.as_ref().map(|c| c.solver.order.len()),
            Some(2)
        );
    }

    #[test]
    fn validation_catches_zero_capacity() {
        let mut cfg = DispatchConfig::baseline();
        cfg.generator.capacity_mw = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "generator.capacity_mw"));
    }

    #[test]
    fn validation_catches_negative_cost() {
        let mut cfg = DispatchConfig::baseline();
        cfg.generator.marginal_cost = -1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "generator.marginal_cost"));
    }

    #[test]
    fn validation_catches_empty_solver_order() {
        let mut cfg = DispatchConfig::baseline();
        cfg.solver.order.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "solver.order"));
    }

    #[test]
    fn validation_catches_zero_timeout() {
        let mut cfg = DispatchConfig::baseline();
        cfg.solver.attempt_timeout_secs = 0;
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "solver.attempt_timeout_secs"));
    }

    #[test]
    fn validation_catches_empty_column_candidates() {
        let mut cfg = DispatchConfig::baseline();
        cfg.columns.load.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "columns.load"));
    }

    #[test]
    fn attempt_timeout_converts_to_duration() {
        let mut cfg = DispatchConfig::baseline();
        cfg.solver.attempt_timeout_secs = 7;
        assert_eq!(cfg.solver.attempt_timeout(), Duration::from_secs(7));
    }
}
