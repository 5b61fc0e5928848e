//! # Settings Module
//!
//! ## Purpose
//! Holds the user-facing simulation inputs in the units the user types them in and turns them
//! into a [`BatchReactorTask`]. Settings are persisted as pretty-printed JSON; a missing file
//! means defaults.
//!
//! ## Units and conversions
//! | Field | Unit | Core value |
//! |-------|------|------------|
//! | `temperature_C` | °C | `ReactorConditions::Tc` |
//! | `duration_min` | min | grid end |
//! | `log10_k0` | log10 of mol/L s | `k0 = 10^log10_k0` |
//! | `Ea_kJ_per_mol` | kJ/mol | `Ea = 1000*Ea_kJ_per_mol` J/mol |
//!
//! ## Configuration Format
//! ```json
//! {
//!   "initial_concentrations": [5.0, 7.0, 0.5, 0.0],
//!   "temperature_C": 50.0,
//!   "duration_min": 100.0,
//!   "reaction_orders": [1.0, 1.0],
//!   "log10_k0": 2.0,
//!   "Ea_kJ_per_mol": 30.0,
//!   "sample_count": 100,
//!   "plot_species": ["A", "B"],
//!   "export_file": "batch_reactor_results.csv",
//!   "log_level": "info",
//!   "solver": { "method": "Auto", "rtol": 1.49012e-8, "atol": 1.49012e-8, "max_steps": 100000, "timeout_secs": null }
//! }
//! ```
use crate::Kinetics::batch_kinetics::{Concentrations, Species};
use crate::ReactorsIVP::BatchReactorIVP::{BatchReactorTask, DEFAULT_SAMPLE_COUNT};
use crate::Utils::export::DEFAULT_EXPORT_FILE;
use crate::ReactorsIVP::batch_reactor_solver::{IntegratorMethod, IntegratorOptions};
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SETTINGS_FILE: &str = "batch_reactor_settings.json";

/// Allowed input ranges, inclusive
pub const TEMPERATURE_RANGE: (f64, f64) = (-50.0, 1000.0);
pub const DURATION_RANGE: (f64, f64) = (0.001, 1000.0);
pub const REACTANT_RANGE: (f64, f64) = (0.001, 1000.0);
pub const PRODUCT_RANGE: (f64, f64) = (-0.001, 1000.0);
pub const LOG10_K0_RANGE: (f64, f64) = (-6.0, 6.0);
pub const EA_KJ_RANGE: (f64, f64) = (0.0, 100.0);

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub method: IntegratorMethod,
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
    /// wall-clock limit of one run, no limit when absent
    pub timeout_secs: Option<f64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        let options = IntegratorOptions::default();
        Self {
            method: options.method,
            rtol: options.rtol,
            atol: options.atol,
            max_steps: options.max_steps,
            timeout_secs: None,
        }
    }
}

impl SolverSettings {
    pub fn to_options(&self) -> IntegratorOptions {
        IntegratorOptions {
            method: self.method,
            rtol: self.rtol,
            atol: self.atol,
            max_steps: self.max_steps,
            max_wall_time: self
                .timeout_secs
                .and_then(|s| Duration::try_from_secs_f64(s).ok()),
            ..Default::default()
        }
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// A, B, C, D in mol/L
    pub initial_concentrations: [f64; 4],
    pub temperature_C: f64,
    pub duration_min: f64,
    /// nA, nB
    pub reaction_orders: [f64; 2],
    pub log10_k0: f64,
    pub Ea_kJ_per_mol: f64,
    pub sample_count: usize,
    pub plot_species: Vec<Species>,
    pub export_file: String,
    pub log_level: String,
    pub solver: SolverSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            initial_concentrations: [5.0, 7.0, 0.5, 0.0],
            temperature_C: 50.0,
            duration_min: 100.0,
            reaction_orders: [1.0, 1.0],
            log10_k0: 2.0,
            Ea_kJ_per_mol: 30.0,
            sample_count: DEFAULT_SAMPLE_COUNT,
            plot_species: vec![Species::A, Species::B],
            export_file: DEFAULT_EXPORT_FILE.to_string(),
            log_level: "info".to_string(),
            solver: SolverSettings::default(),
        }
    }
}

fn check_range(name: &str, value: f64, (min, max): (f64, f64)) -> Result<(), SettingsError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        })
    }
}

impl SimulationSettings {
    /// Reads the settings file, defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let settings: SimulationSettings = serde_json::from_str(&content)?;
            info!("settings loaded from {}", path.display());
            Ok(settings)
        } else {
            info!("{} not found, using default settings", path.display());
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        info!("settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// k0 = 10^log10_k0
    pub fn pre_exponential_factor(&self) -> f64 {
        10f64.powf(self.log10_k0)
    }

    /// J/mol
    pub fn activation_energy(&self) -> f64 {
        self.Ea_kJ_per_mol * 1000.0
    }

    pub fn initial(&self) -> Concentrations {
        Concentrations(self.initial_concentrations)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("temperature (C)", self.temperature_C, TEMPERATURE_RANGE)?;
        check_range("duration (min)", self.duration_min, DURATION_RANGE)?;
        for s in Species::ALL {
            let range = if s.is_reactant() {
                REACTANT_RANGE
            } else {
                PRODUCT_RANGE
            };
            check_range(
                &format!("initial {}", s.column_header()),
                self.initial_concentrations[s.index()],
                range,
            )?;
        }
        for (name, n) in [("nA", self.reaction_orders[0]), ("nB", self.reaction_orders[1])] {
            if !(n.is_finite() && n >= 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "reaction order {} must be non-negative, got {}",
                    name, n
                )));
            }
        }
        check_range("log10(k0)", self.log10_k0, LOG10_K0_RANGE)?;
        check_range("Ea (kJ/mol)", self.Ea_kJ_per_mol, EA_KJ_RANGE)?;
        if self.sample_count < 1 {
            return Err(SettingsError::Invalid(
                "sample count must be at least 1".to_string(),
            ));
        }
        if let Some(secs) = self.solver.timeout_secs {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "timeout must be a non-negative number of seconds, got {}",
                    secs
                )));
            }
        }
        self.solver
            .to_options()
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    /// Validated task ready for `solve()`
    pub fn to_task(&self) -> Result<BatchReactorTask, SettingsError> {
        self.validate()?;
        let mut task = BatchReactorTask::new();
        task.set_initial_concentrations(self.initial());
        task.set_temperature(self.temperature_C);
        task.set_reaction_orders(self.reaction_orders[0], self.reaction_orders[1]);
        task.set_kinetic_parameters(self.pre_exponential_factor(), self.activation_energy());
        task.set_duration(self.duration_min);
        task.set_sample_count(self.sample_count);
        task.set_solver_options(self.solver.to_options());
        Ok(task)
    }

    /// Falls back to `Info` for unknown names
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let settings = SimulationSettings::default();
        settings.validate().unwrap();
        assert_relative_eq!(settings.pre_exponential_factor(), 100.0, max_relative = 1e-14);
        assert_eq!(settings.activation_energy(), 30_000.0);
        assert_eq!(settings.plot_species, vec![Species::A, Species::B]);
    }

    #[test]
    fn test_to_task_converts_units() {
        let settings = SimulationSettings {
            log10_k0: -3.0,
            Ea_kJ_per_mol: 12.5,
            temperature_C: 80.0,
            ..Default::default()
        };
        let task = settings.to_task().unwrap();
        assert_relative_eq!(task.parameters.k0, 1e-3, max_relative = 1e-14);
        assert_eq!(task.parameters.Ea, 12_500.0);
        assert_eq!(task.conditions.Tc, 80.0);
        assert_eq!(task.initial, Concentrations::new(5.0, 7.0, 0.5, 0.0));
        assert_eq!(task.sample_count, 100);
    }

    #[test]
    fn test_ranges() {
        let out_of_range = |s: SimulationSettings| {
            matches!(s.validate(), Err(SettingsError::OutOfRange { .. }))
        };
        assert!(out_of_range(SimulationSettings {
            temperature_C: -60.0,
            ..Default::default()
        }));
        assert!(out_of_range(SimulationSettings {
            duration_min: 0.0,
            ..Default::default()
        }));
        assert!(out_of_range(SimulationSettings {
            initial_concentrations: [0.0, 7.0, 0.5, 0.0],
            ..Default::default()
        }));
        assert!(out_of_range(SimulationSettings {
            initial_concentrations: [5.0, 7.0, -0.01, 0.0],
            ..Default::default()
        }));
        assert!(out_of_range(SimulationSettings {
            log10_k0: 7.0,
            ..Default::default()
        }));
        assert!(out_of_range(SimulationSettings {
            Ea_kJ_per_mol: f64::NAN,
            ..Default::default()
        }));
        // the product range admits a small negative value
        SimulationSettings {
            initial_concentrations: [5.0, 7.0, -0.001, 1000.0],
            ..Default::default()
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn test_invalid_orders_and_solver() {
        let settings = SimulationSettings {
            reaction_orders: [-1.0, 1.0],
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
        let mut settings = SimulationSettings::default();
        settings.solver.timeout_secs = Some(-1.0);
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
        let mut settings = SimulationSettings::default();
        settings.solver.rtol = 0.0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
        let mut settings = SimulationSettings::default();
        settings.sample_count = 0;
        assert!(matches!(settings.to_task(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_timeout_conversion() {
        let mut solver = SolverSettings::default();
        assert_eq!(solver.to_options().max_wall_time, None);
        solver.timeout_secs = Some(2.5);
        assert_eq!(
            solver.to_options().max_wall_time,
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let settings = SimulationSettings {
            temperature_C: 75.0,
            plot_species: vec![Species::C],
            log_level: "debug".to_string(),
            ..Default::default()
        };
        settings.save(file.path()).unwrap();
        let loaded = SimulationSettings::load_or_default(file.path()).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.log_level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let loaded = SimulationSettings::load_or_default(&path).unwrap();
        assert_eq!(loaded, SimulationSettings::default());
    }

    #[test]
    fn test_partial_file_is_completed_with_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{ "temperature_C": 20.0, "plot_species": ["D"] }"#).unwrap();
        let loaded = SimulationSettings::load_or_default(file.path()).unwrap();
        assert_eq!(loaded.temperature_C, 20.0);
        assert_eq!(loaded.plot_species, vec![Species::D]);
        assert_eq!(loaded.duration_min, 100.0);
        assert_eq!(loaded.solver, SolverSettings::default());
    }

    #[test]
    fn test_broken_json() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(
            SimulationSettings::load_or_default(file.path()),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_log_level() {
        let settings = SimulationSettings {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.log_level_filter(), LevelFilter::Info);
    }
}
