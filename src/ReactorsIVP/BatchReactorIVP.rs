//! # Batch Reactor IVP Module
//!
//! Time evolution of the isothermal batch reactor `A + B => C + D`.
//!
//! ## Main Structures
//!
//! - **`Trajectory`**: concentrations of all species on an evenly spaced time grid
//! - **`BatchReactorTask`**: task object holding the inputs, solver options and the last solution
//! - **`ReactorError`**: validation and integration failures
//!
//! ## Mathematical Model
//!
//! ```text
//! dCA/dt = dCB/dt = -k*CA^nA*CB^nB
//! dCC/dt = dCD/dt = +k*CA^nA*CB^nB,   k = k0*exp(-Ea/(R*(Tc + 273.15)))
//! ```
//! integrated over `[0, duration]` with the RustedSciThe solvers driven by
//! [`super::batch_reactor_solver`]; the solver output is resampled onto the time grid.
//!
//! Time is in minutes, the rate constant is applied to the minute axis as is.
//!
//! ## Example
//! ```rust, ignore
//! let mut task = BatchReactorTask::new();
//! task.set_temperature(80.0);
//! task.solve()?;
//! task.pretty_print_results();
//! ```
use crate::Kinetics::batch_kinetics::{
    BatchKinetics, Concentrations, KineticParameters, ReactionOrders, ReactorConditions, Species,
    ZERO_CELSIUS_K,
};
use crate::Utils::export::{ExportError, export_trajectory_csv};
use super::batch_reactor_solver::{
    IntegrationError, IntegrationStats, IntegratorOptions, integrate_on_grid,
};
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_SAMPLE_COUNT: usize = 100;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReactorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Integration failure: {0}")]
    IntegrationFailure(#[from] IntegrationError),
}

/// Sampled solution: `t[i]` and row `i` of `y` (columns A, B, C, D)
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub t: DVector<f64>,
    pub y: DMatrix<f64>,
    pub stats: IntegrationStats,
}

impl Trajectory {
    /// builds a trajectory from rows, used when reading exported results
    pub fn from_rows(t: Vec<f64>, rows: &[Concentrations]) -> Self {
        let y = DMatrix::from_fn(rows.len(), 4, |i, j| rows[i].0[j]);
        Self {
            t: DVector::from_vec(t),
            y,
            stats: IntegrationStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn column(&self, species: Species) -> Vec<f64> {
        self.y.column(species.index()).iter().copied().collect()
    }

    pub fn sample(&self, i: usize) -> Concentrations {
        Concentrations([self.y[(i, 0)], self.y[(i, 1)], self.y[(i, 2)], self.y[(i, 3)]])
    }

    pub fn final_state(&self) -> Option<Concentrations> {
        if self.is_empty() {
            None
        } else {
            Some(self.sample(self.len() - 1))
        }
    }
}

/// `sample_count` evenly spaced times from 0 to `duration`, the last one exactly `duration`
pub fn time_grid(duration: f64, sample_count: usize) -> Vec<f64> {
    match sample_count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        duration
                    } else {
                        duration * (i as f64 / last)
                    }
                })
                .collect()
        }
    }
}

/// Domain checks performed before any integration work
pub fn validate_inputs(
    initial: &Concentrations,
    conditions: &ReactorConditions,
    orders: &ReactionOrders,
    parameters: &KineticParameters,
    duration: f64,
    sample_count: usize,
) -> Result<(), ReactorError> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(ReactorError::InvalidParameter(format!(
            "duration must be finite and positive, got {}",
            duration
        )));
    }
    if sample_count < 1 {
        return Err(ReactorError::InvalidParameter(
            "sample_count must be at least 1".to_string(),
        ));
    }
    if !(parameters.k0.is_finite() && parameters.k0 > 0.0) {
        return Err(ReactorError::InvalidParameter(format!(
            "k0 must be finite and positive, got {}",
            parameters.k0
        )));
    }
    if !(parameters.Ea.is_finite() && parameters.Ea >= 0.0) {
        return Err(ReactorError::InvalidParameter(format!(
            "Ea must be finite and non-negative, got {}",
            parameters.Ea
        )));
    }
    if let Some(s) = initial.first_non_finite() {
        return Err(ReactorError::InvalidParameter(format!(
            "initial concentration of {} is not finite: {}",
            s, initial[s]
        )));
    }
    for (name, n) in [("nA", orders.nA), ("nB", orders.nB)] {
        if !(n.is_finite() && n >= 0.0) {
            return Err(ReactorError::InvalidParameter(format!(
                "reaction order {} must be finite and non-negative, got {}",
                name, n
            )));
        }
    }
    if !(conditions.Tc.is_finite() && conditions.Tc > -ZERO_CELSIUS_K) {
        return Err(ReactorError::InvalidParameter(format!(
            "temperature must be finite and above absolute zero, got {} C",
            conditions.Tc
        )));
    }
    Ok(())
}

/// Solves the reactor with the default integrator settings
pub fn solve_trajectory(
    initial: &Concentrations,
    conditions: &ReactorConditions,
    orders: &ReactionOrders,
    parameters: &KineticParameters,
    duration: f64,
    sample_count: usize,
) -> Result<Trajectory, ReactorError> {
    solve_trajectory_with_options(
        initial,
        conditions,
        orders,
        parameters,
        duration,
        sample_count,
        &IntegratorOptions::default(),
    )
}

pub fn solve_trajectory_with_options(
    initial: &Concentrations,
    conditions: &ReactorConditions,
    orders: &ReactionOrders,
    parameters: &KineticParameters,
    duration: f64,
    sample_count: usize,
    options: &IntegratorOptions,
) -> Result<Trajectory, ReactorError> {
    validate_inputs(initial, conditions, orders, parameters, duration, sample_count)?;
    options
        .validate()
        .map_err(|e| ReactorError::InvalidParameter(e.to_string()))?;
    let model = BatchKinetics::new(*conditions, *orders, *parameters);
    let grid = time_grid(duration, sample_count);
    info!(
        "batch reactor: T = {} C, k = {:.4e}, orders ({}, {}), {} samples over {} min",
        conditions.Tc,
        model.rate_constant(),
        orders.nA,
        orders.nB,
        sample_count,
        duration
    );
    let solution = integrate_on_grid(&model, initial, &grid, options).map_err(|e| {
        warn!("batch reactor integration failed: {}", e);
        ReactorError::IntegrationFailure(e)
    })?;
    info!(
        "solved with {}: {} solver points in {:?}",
        solution.stats.solver, solution.stats.solver_points, solution.stats.wall_time
    );
    Ok(Trajectory {
        t: solution.t,
        y: solution.y,
        stats: solution.stats,
    })
}

/// Batch reactor problem with setters, validation, solution and export
#[derive(Debug, Clone)]
pub struct BatchReactorTask {
    pub problem_name: Option<String>,
    pub initial: Concentrations,
    pub conditions: ReactorConditions,
    pub orders: ReactionOrders,
    pub parameters: KineticParameters,
    /// min
    pub duration: f64,
    pub sample_count: usize,
    pub options: IntegratorOptions,
    trajectory: Option<Trajectory>,
}

impl Default for BatchReactorTask {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchReactorTask {
    pub fn new() -> Self {
        Self {
            problem_name: None,
            initial: Concentrations::new(5.0, 7.0, 0.5, 0.0),
            conditions: ReactorConditions::new(50.0),
            orders: ReactionOrders::new(1.0, 1.0),
            parameters: KineticParameters::new(100.0, 30_000.0),
            duration: 100.0,
            sample_count: DEFAULT_SAMPLE_COUNT,
            options: IntegratorOptions::default(),
            trajectory: None,
        }
    }

    pub fn set_problem_name(&mut self, name: &str) {
        self.problem_name = Some(name.to_string());
    }

    pub fn set_initial_concentrations(&mut self, initial: Concentrations) {
        self.initial = initial;
    }

    /// Tc in °C
    pub fn set_temperature(&mut self, Tc: f64) {
        self.conditions = ReactorConditions::new(Tc);
    }

    pub fn set_reaction_orders(&mut self, nA: f64, nB: f64) {
        self.orders = ReactionOrders::new(nA, nB);
    }

    /// k0 and Ea in J/mol
    pub fn set_kinetic_parameters(&mut self, k0: f64, Ea: f64) {
        self.parameters = KineticParameters::new(k0, Ea);
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub fn set_sample_count(&mut self, sample_count: usize) {
        self.sample_count = sample_count;
    }

    pub fn set_solver_options(&mut self, options: IntegratorOptions) {
        self.options = options;
    }

    pub fn check_task(&self) -> Result<(), ReactorError> {
        validate_inputs(
            &self.initial,
            &self.conditions,
            &self.orders,
            &self.parameters,
            self.duration,
            self.sample_count,
        )?;
        self.options
            .validate()
            .map_err(|e| ReactorError::InvalidParameter(e.to_string()))
    }

    /// Runs the simulation. The previous trajectory is dropped even if this run fails.
    pub fn solve(&mut self) -> Result<(), ReactorError> {
        self.trajectory = None;
        self.check_task()?;
        let trajectory = solve_trajectory_with_options(
            &self.initial,
            &self.conditions,
            &self.orders,
            &self.parameters,
            self.duration,
            self.sample_count,
            &self.options,
        )?;
        self.trajectory = Some(trajectory);
        Ok(())
    }

    pub fn get_trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Writes the last trajectory as CSV
    pub fn save_result<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let trajectory = self.trajectory.as_ref().ok_or(ExportError::NoTrajectory)?;
        export_trajectory_csv(trajectory, path)
    }
}
