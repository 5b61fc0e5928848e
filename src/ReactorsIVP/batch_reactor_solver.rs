//! # Batch Reactor Solver
//!
//! Integration of the batch reactor rate equations with the symbolic ODE solvers of
//! RustedSciThe and resampling of the solver output onto the requested time grid.
//!
//! ## Method selection
//! - [`IntegratorMethod::NonStiff`]: explicit RK45
//! - [`IntegratorMethod::Stiff`]: BDF
//! - [`IntegratorMethod::Radau`]: implicit Radau IIA of order 3
//! - [`IntegratorMethod::Auto`]: BDF when `||J||_inf * duration` at the initial state exceeds
//!   [`STIFFNESS_THRESHOLD`], RK45 otherwise
//!
//! ## Failure detection
//! The raw solver output is checked after the run:
//! - no output at all, or a panic inside the solver
//! - non-finite time or concentration
//! - a negative reactant raised to a fractional order
//! - last time point short of the requested duration
//! - wall-clock time above the configured limit
//!
//! ## Resampling
//! Between two solver points the state is interpolated with cubic Hermite polynomials, the
//! slopes come from the exact rate law. The first grid row is the initial state itself.
use crate::Kinetics::batch_kinetics::{BatchKinetics, Concentrations, STATE_VARIABLES, TIME_VARIABLE};
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use RustedSciThe::numerical::Radau::Radau_main::RadauOrder;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};
use thiserror::Error;

/// `||J||_inf * duration` above which `Auto` picks the stiff solver
pub const STIFFNESS_THRESHOLD: f64 = 500.0;
/// relative slack allowed between the last solver time and the requested end
const END_TIME_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IntegratorMethod {
    #[default]
    Auto,
    NonStiff,
    Stiff,
    Radau,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("invalid solver options: {0}")]
    InvalidOptions(String),
    #[error("solver {solver} returned no solution")]
    NoSolution { solver: String },
    #[error("solver {solver} aborted: {message}")]
    SolverPanic { solver: String, message: String },
    #[error("non-finite value in the solution at t = {t}")]
    NonFinite { t: f64 },
    #[error("invalid state at t = {t}: {reason}")]
    InvalidState { t: f64, reason: String },
    #[error("solver stopped at t = {t_reached}, before the end time {t_end}")]
    Incomplete { t_reached: f64, t_end: f64 },
    #[error("run took {elapsed:?}, longer than the limit of {limit:?}")]
    Timeout { elapsed: Duration, limit: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorOptions {
    pub method: IntegratorMethod,
    pub rtol: f64,
    pub atol: f64,
    /// first trial step, chosen by the solver when `None`
    pub first_step: Option<f64>,
    /// largest step, the grid spacing when `None`
    pub h_max: Option<f64>,
    /// iteration budget handed to the solver
    pub max_steps: usize,
    pub max_wall_time: Option<Duration>,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self {
            method: IntegratorMethod::Auto,
            rtol: 1.49012e-8,
            atol: 1.49012e-8,
            first_step: None,
            h_max: None,
            max_steps: 100_000,
            max_wall_time: None,
        }
    }
}

impl IntegratorOptions {
    pub fn validate(&self) -> Result<(), IntegrationError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(IntegrationError::InvalidOptions(format!(
                    "{} must be finite and > 0, got {}",
                    name, value
                )))
            }
        };
        positive("rtol", self.rtol)?;
        positive("atol", self.atol)?;
        if let Some(h0) = self.first_step {
            positive("first_step", h0)?;
        }
        if let Some(h_max) = self.h_max {
            positive("h_max", h_max)?;
        }
        if self.max_steps == 0 {
            return Err(IntegrationError::InvalidOptions(
                "max_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// What the solver did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntegrationStats {
    /// "RK45", "BDF", "Radau3", or "none" when no integration was needed
    pub solver: String,
    /// time points produced by the solver before resampling
    pub solver_points: usize,
    pub stiffness_indicator: f64,
    pub wall_time: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSolution {
    pub t: DVector<f64>,
    /// one row per grid time, columns A, B, C, D
    pub y: DMatrix<f64>,
    pub stats: IntegrationStats,
}

/// Solver variant and its name for the statistics
pub fn solver_type(method: IntegratorMethod, stiffness_indicator: f64) -> (SolverType, &'static str) {
    match method {
        IntegratorMethod::NonStiff => (SolverType::NonStiff("RK45".to_owned()), "RK45"),
        IntegratorMethod::Stiff => (SolverType::BDF, "BDF"),
        IntegratorMethod::Radau => (SolverType::Radau(RadauOrder::Order3), "Radau3"),
        IntegratorMethod::Auto => {
            if stiffness_indicator > STIFFNESS_THRESHOLD {
                (SolverType::BDF, "BDF")
            } else {
                (SolverType::NonStiff("RK45".to_owned()), "RK45")
            }
        }
    }
}

/// Parameter map in the form `UniversalODESolver::set_parameters` expects
pub fn solver_params(options: &IntegratorOptions, t_end: f64, grid_spacing: f64) -> HashMap<String, SolverParam> {
    let max_step = options.h_max.unwrap_or(grid_spacing).min(t_end);
    HashMap::from([
        ("step_size".to_owned(), SolverParam::Float(options.first_step.unwrap_or(max_step * 1e-3))),
        ("tolerance".to_owned(), SolverParam::Float(options.rtol)),
        ("max_iterations".to_owned(), SolverParam::Int(options.max_steps as _)),
        ("rtol".to_owned(), SolverParam::Float(options.rtol)),
        ("atol".to_owned(), SolverParam::Float(options.atol)),
        ("max_step".to_owned(), SolverParam::Float(max_step)),
        ("first_step".to_owned(), SolverParam::OptionalFloat(options.first_step)),
        ("vectorized".to_owned(), SolverParam::Bool(false)),
        ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
        ("parallel".to_owned(), SolverParam::Bool(true)),
    ])
}

/// Integrates `model` from `y0` and returns the state at every time of `grid`.
/// `grid` starts at 0 and increases strictly.
pub fn integrate_on_grid(
    model: &BatchKinetics,
    y0: &Concentrations,
    grid: &[f64],
    options: &IntegratorOptions,
) -> Result<GridSolution, IntegrationError> {
    options.validate()?;
    let started = Instant::now();
    let Some(&t_end) = grid.last() else {
        return Ok(constant_solution(y0, grid, IntegrationStats::default()));
    };
    if grid.len() == 1 || t_end == 0.0 {
        return Ok(constant_solution(y0, grid, IntegrationStats {
            solver: "none".to_string(),
            ..Default::default()
        }));
    }
    model
        .check_state(y0)
        .map_err(|reason| IntegrationError::InvalidState { t: 0.0, reason })?;
    let rate = model.rate(y0);
    if !rate.is_finite() {
        return Err(IntegrationError::NonFinite { t: 0.0 });
    }
    let indicator = model.stiffness_indicator(y0, t_end);
    // dC/dt depends on the state only: a zero rate is an equilibrium
    if rate == 0.0 {
        debug!("zero initial rate, the composition stays constant");
        return Ok(constant_solution(y0, grid, IntegrationStats {
            solver: "none".to_string(),
            stiffness_indicator: indicator,
            wall_time: started.elapsed(),
            ..Default::default()
        }));
    }

    let (solvertype, solver_name) = solver_type(options.method, indicator);
    info!(
        "integrating to t = {} with {} (stiffness indicator {:.3e})",
        t_end, solver_name, indicator
    );
    let params = solver_params(options, t_end, grid[1] - grid[0]);
    let (t_raw, y_raw) = run_solver(model, y0, t_end, solvertype, params).map_err(|message| {
        IntegrationError::SolverPanic {
            solver: solver_name.to_string(),
            message,
        }
    })?;
    let (t_raw, y_raw) = match (t_raw, y_raw) {
        (Some(t), Some(y)) if !t.is_empty() => (t, y),
        _ => {
            return Err(IntegrationError::NoSolution {
                solver: solver_name.to_string(),
            });
        }
    };
    let y_raw = rows_per_time(y_raw, t_raw.len());
    check_raw_solution(model, &t_raw, &y_raw, t_end)?;

    let wall_time = started.elapsed();
    if let Some(limit) = options.max_wall_time {
        if wall_time >= limit {
            return Err(IntegrationError::Timeout {
                elapsed: wall_time,
                limit,
            });
        }
    }
    let y = resample(model, y0, &t_raw, &y_raw, grid);
    debug!("{} solver points resampled onto {} grid points", t_raw.len(), grid.len());
    Ok(GridSolution {
        t: DVector::from_column_slice(grid),
        y,
        stats: IntegrationStats {
            solver: solver_name.to_string(),
            solver_points: t_raw.len(),
            stiffness_indicator: indicator,
            wall_time,
        },
    })
}

fn constant_solution(y0: &Concentrations, grid: &[f64], stats: IntegrationStats) -> GridSolution {
    GridSolution {
        t: DVector::from_column_slice(grid),
        y: DMatrix::from_fn(grid.len(), 4, |_, j| y0.0[j]),
        stats,
    }
}

/// Runs `UniversalODESolver`. A panic inside the solver comes back as `Err` with its message.
fn run_solver(
    model: &BatchKinetics,
    y0: &Concentrations,
    t_end: f64,
    solvertype: SolverType,
    params: HashMap<String, SolverParam>,
) -> Result<(Option<DVector<f64>>, Option<DMatrix<f64>>), String> {
    let equations = model.rate_equations();
    let values: Vec<String> = STATE_VARIABLES.iter().map(|v| v.to_string()).collect();
    catch_unwind(AssertUnwindSafe(|| {
        let mut ode = UniversalODESolver::new(
            equations,
            values,
            TIME_VARIABLE.to_owned(),
            solvertype,
            0.0,
            y0.to_dvector(),
            t_end,
        );
        ode.set_parameters(params);
        ode.initialize();
        ode.solve();
        ode.get_result()
    }))
    .map_err(|payload| {
        let message = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!("ODE solver panicked: {}", message);
        message
    })
}

/// Solver output with one row per time point
fn rows_per_time(y: DMatrix<f64>, n_times: usize) -> DMatrix<f64> {
    if y.nrows() != n_times && y.ncols() == n_times {
        y.transpose()
    } else {
        y
    }
}

fn check_raw_solution(
    model: &BatchKinetics,
    t: &DVector<f64>,
    y: &DMatrix<f64>,
    t_end: f64,
) -> Result<(), IntegrationError> {
    if y.ncols() != 4 || y.nrows() != t.len() {
        return Err(IntegrationError::NoSolution {
            solver: format!("output of shape {}x{}", y.nrows(), y.ncols()),
        });
    }
    for (i, &ti) in t.iter().enumerate() {
        let state = row_state(y, i);
        if !ti.is_finite() || !state.is_finite() {
            return Err(IntegrationError::NonFinite { t: ti });
        }
        model
            .check_state(&state)
            .map_err(|reason| IntegrationError::InvalidState { t: ti, reason })?;
    }
    let t_reached = t[t.len() - 1];
    if t_reached < t_end * (1.0 - END_TIME_SLACK) {
        return Err(IntegrationError::Incomplete { t_reached, t_end });
    }
    Ok(())
}

fn row_state(y: &DMatrix<f64>, i: usize) -> Concentrations {
    Concentrations([y[(i, 0)], y[(i, 1)], y[(i, 2)], y[(i, 3)]])
}

/// Cubic Hermite interpolation of the solver output at the grid times
fn resample(
    model: &BatchKinetics,
    y0: &Concentrations,
    t_raw: &DVector<f64>,
    y_raw: &DMatrix<f64>,
    grid: &[f64],
) -> DMatrix<f64> {
    let mut y = DMatrix::zeros(grid.len(), 4);
    let mut segment = 0;
    for (row, &t) in grid.iter().enumerate() {
        if row == 0 {
            y.row_mut(0).copy_from_slice(&y0.0);
            continue;
        }
        while segment + 2 < t_raw.len() && t_raw[segment + 1] < t {
            segment += 1;
        }
        let state = if t_raw.len() == 1 {
            row_state(y_raw, 0)
        } else {
            hermite(model, t_raw, y_raw, segment, t)
        };
        y.row_mut(row).copy_from_slice(&state.0);
    }
    y
}

fn hermite(
    model: &BatchKinetics,
    t_raw: &DVector<f64>,
    y_raw: &DMatrix<f64>,
    segment: usize,
    t: f64,
) -> Concentrations {
    let (t0, t1) = (t_raw[segment], t_raw[segment + 1]);
    let (y0, y1) = (row_state(y_raw, segment), row_state(y_raw, segment + 1));
    let h = t1 - t0;
    if h <= 0.0 {
        return y1;
    }
    if t >= t1 {
        return y1;
    }
    let (f0, f1) = (model.derivatives(&y0), model.derivatives(&y1));
    let s = ((t - t0) / h).clamp(0.0, 1.0);
    let (s2, s3) = (s * s, s * s * s);
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    let mut out = [0.0; 4];
    for j in 0..4 {
        out[j] = h00 * y0.0[j] + h10 * h * f0.0[j] + h01 * y1.0[j] + h11 * h * f1.0[j];
    }
    Concentrations(out)
}
