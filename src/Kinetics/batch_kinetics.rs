//! # Batch Kinetics Module
//!
//! Rate law of the single irreversible reaction `A + B => C + D` in an isothermal,
//! well-mixed, constant-volume batch reactor.
//!
//! ## Mathematical Model
//!
//! ```text
//! T      = Tc + 273.15
//! k      = k0 * exp(-Ea/(R*T))
//! rate   = k * CA^nA * CB^nB
//! dCA/dt = dCB/dt = -rate
//! dCC/dt = dCD/dt = +rate
//! ```
//!
//! Stoichiometry is fixed (all coefficients are 1) and is not a parameter of the model.
//!
//! ## Numeric conventions
//! - every function here is pure and deterministic
//! - non-finite results (overflow of `exp`, fractional power of a negative concentration)
//!   are returned as values, they are never turned into errors at this level
//! - concentrations are not clamped: integer orders keep working with negative
//!   concentrations, fractional orders produce `NaN`. Use [`fractional_negative_species`]
//!   to find out which reactant is responsible
//!
//! ## Example
//! ```rust, ignore
//! use BatchReactor::Kinetics::batch_kinetics::*;
//! let c = Concentrations::new(5.0, 7.0, 0.5, 0.0);
//! let dcdt = rate_derivatives(
//!     &c,
//!     &ReactorConditions::new(50.0),
//!     &ReactionOrders::new(1.0, 1.0),
//!     &KineticParameters::new(100.0, 30_000.0),
//! );
//! assert!(dcdt[Species::A] < 0.0);
//! ```
use RustedSciThe::symbolic::symbolic_engine::Expr;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Universal gas constant in J/(mol·K)
pub const R_G: f64 = 8.3145;
/// 0 °C in K
pub const ZERO_CELSIUS_K: f64 = 273.15;
/// names of the state variables in the symbolic rate equations
pub const STATE_VARIABLES: [&str; 4] = ["CA", "CB", "CC", "CD"];
/// name of the independent variable (min)
pub const TIME_VARIABLE: &str = "t";

/// Chemical species of the reaction A + B => C + D
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    A,
    B,
    C,
    D,
}

impl Species {
    pub const ALL: [Species; 4] = [Species::A, Species::B, Species::C, Species::D];

    /// position of the species in the state vector
    pub fn index(&self) -> usize {
        match self {
            Species::A => 0,
            Species::B => 1,
            Species::C => 2,
            Species::D => 3,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Species::A => "A",
            Species::B => "B",
            Species::C => "C",
            Species::D => "D",
        }
    }

    /// name of the plotted series ("Conc A")
    pub fn label(&self) -> String {
        format!("Conc {}", self.key())
    }

    /// spreadsheet column header with units ("A (mol/L)")
    pub fn column_header(&self) -> String {
        format!("{} (mol/L)", self.key())
    }

    pub fn is_reactant(&self) -> bool {
        matches!(self, Species::A | Species::B)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Species {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Species::A),
            "B" => Ok(Species::B),
            "C" => Ok(Species::C),
            "D" => Ok(Species::D),
            other => Err(format!("unknown species '{}', expected one of A, B, C, D", other)),
        }
    }
}

/// Concentrations of A, B, C, D in mol/L
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concentrations(pub [f64; 4]);

impl Concentrations {
    pub fn new(CA: f64, CB: f64, CC: f64, CD: f64) -> Self {
        Self([CA, CB, CC, CD])
    }

    pub fn zeros() -> Self {
        Self([0.0; 4])
    }

    pub fn get(&self, species: Species) -> f64 {
        self.0[species.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_dvector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.0)
    }

    /// takes the first four components of the vector
    pub fn from_dvector(y: &DVector<f64>) -> Self {
        Self([y[0], y[1], y[2], y[3]])
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    pub fn first_non_finite(&self) -> Option<Species> {
        Species::ALL
            .into_iter()
            .find(|s| !self.get(*s).is_finite())
    }
}

impl Index<Species> for Concentrations {
    type Output = f64;
    fn index(&self, species: Species) -> &f64 {
        &self.0[species.index()]
    }
}

/// Isothermal reactor state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactorConditions {
    /// Temperature (°C)
    pub Tc: f64,
}

impl ReactorConditions {
    pub fn new(Tc: f64) -> Self {
        Self { Tc }
    }
    /// Temperature (K)
    pub fn temperature_K(&self) -> f64 {
        self.Tc + ZERO_CELSIUS_K
    }
}

/// Exponents of CA and CB in the rate expression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactionOrders {
    pub nA: f64,
    pub nB: f64,
}

impl ReactionOrders {
    pub fn new(nA: f64, nB: f64) -> Self {
        Self { nA, nB }
    }

    pub fn order_of(&self, species: Species) -> Option<f64> {
        match species {
            Species::A => Some(self.nA),
            Species::B => Some(self.nB),
            _ => None,
        }
    }
}

/// Arrhenius parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticParameters {
    /// Pre-exponential factor (mol/L·s)
    pub k0: f64,
    /// Activation energy (J/mol)
    pub Ea: f64,
}

impl KineticParameters {
    pub fn new(k0: f64, Ea: f64) -> Self {
        Self { k0, Ea }
    }
}

/// k = k0 * exp(-Ea/(R*T))
pub fn rate_constant(conditions: &ReactorConditions, parameters: &KineticParameters) -> f64 {
    let T = conditions.temperature_K();
    parameters.k0 * (-parameters.Ea / (R_G * T)).exp()
}

fn power_law(k: f64, CA: f64, CB: f64, orders: &ReactionOrders) -> f64 {
    k * CA.powf(orders.nA) * CB.powf(orders.nB)
}

/// rate = k * CA^nA * CB^nB
pub fn reaction_rate(
    concentrations: &Concentrations,
    conditions: &ReactorConditions,
    orders: &ReactionOrders,
    parameters: &KineticParameters,
) -> f64 {
    let k = rate_constant(conditions, parameters);
    power_law(k, concentrations[Species::A], concentrations[Species::B], orders)
}

/// Time derivatives of the concentration vector
pub fn rate_derivatives(
    concentrations: &Concentrations,
    conditions: &ReactorConditions,
    orders: &ReactionOrders,
    parameters: &KineticParameters,
) -> Concentrations {
    let rate = reaction_rate(concentrations, conditions, orders, parameters);
    Concentrations([-rate, -rate, rate, rate])
}

fn is_integer_order(n: f64) -> bool {
    n.fract() == 0.0
}

/// First reactant with a negative concentration raised to a non-integer order.
/// Such a power has no real value, the rate law returns NaN for it.
pub fn fractional_negative_species(
    concentrations: &Concentrations,
    orders: &ReactionOrders,
) -> Option<Species> {
    [Species::A, Species::B].into_iter().find(|s| {
        let n = orders.order_of(*s).unwrap_or(0.0);
        concentrations[*s] < 0.0 && !is_integer_order(n)
    })
}

/// d(C^n)/dC. Zero for the zeroth order, and zero at C = 0 for 0 < n < 1 where the
/// derivative is unbounded.
fn order_derivative(C: f64, n: f64) -> f64 {
    if n == 0.0 || (C == 0.0 && n < 1.0) {
        0.0
    } else {
        n * C.powf(n - 1.0)
    }
}

/// C^n as an expression: the zeroth order drops the factor, the first order keeps the bare
/// variable
fn power_factor(name: &str, n: f64) -> Option<Expr> {
    let C = Expr::Var(name.to_owned());
    if n == 0.0 {
        None
    } else if n == 1.0 {
        Some(C)
    } else {
        Some(C.pow(Expr::Const(n)))
    }
}

/// Kinetic model with the rate constant evaluated once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchKinetics {
    pub conditions: ReactorConditions,
    pub orders: ReactionOrders,
    pub parameters: KineticParameters,
    k: f64,
}

impl BatchKinetics {
    pub fn new(
        conditions: ReactorConditions,
        orders: ReactionOrders,
        parameters: KineticParameters,
    ) -> Self {
        let k = rate_constant(&conditions, &parameters);
        Self {
            conditions,
            orders,
            parameters,
            k,
        }
    }

    pub fn rate_constant(&self) -> f64 {
        self.k
    }

    pub fn rate(&self, concentrations: &Concentrations) -> f64 {
        power_law(
            self.k,
            concentrations[Species::A],
            concentrations[Species::B],
            &self.orders,
        )
    }

    pub fn derivatives(&self, concentrations: &Concentrations) -> Concentrations {
        let rate = self.rate(concentrations);
        Concentrations([-rate, -rate, rate, rate])
    }

    /// `k*CA^nA*CB^nB` in the variables of [`STATE_VARIABLES`]
    pub fn rate_expression(&self) -> Expr {
        [
            power_factor(STATE_VARIABLES[0], self.orders.nA),
            power_factor(STATE_VARIABLES[1], self.orders.nB),
        ]
        .into_iter()
        .flatten()
        .fold(Expr::Const(self.k), |acc, factor| acc * factor)
    }

    /// Right-hand sides of dCA/dt, dCB/dt, dCC/dt, dCD/dt for the symbolic solver
    pub fn rate_equations(&self) -> Vec<Expr> {
        let rate = self.rate_expression();
        vec![-rate.clone(), -rate.clone(), rate.clone(), rate]
    }

    /// Analytic Jacobian of the right-hand side, 4x4
    pub fn jacobian(&self, concentrations: &Concentrations) -> DMatrix<f64> {
        let (CA, CB) = (concentrations[Species::A], concentrations[Species::B]);
        let dr_dA = self.k * order_derivative(CA, self.orders.nA) * CB.powf(self.orders.nB);
        let dr_dB = self.k * CA.powf(self.orders.nA) * order_derivative(CB, self.orders.nB);
        let mut jac = DMatrix::zeros(4, 4);
        for (row, sign) in [(0, -1.0), (1, -1.0), (2, 1.0), (3, 1.0)] {
            jac[(row, 0)] = sign * dr_dA;
            jac[(row, 1)] = sign * dr_dB;
        }
        jac
    }

    /// `||J||_inf * duration`: how many relaxation times of the fastest mode fit into the run
    pub fn stiffness_indicator(&self, concentrations: &Concentrations, duration: f64) -> f64 {
        let jac = self.jacobian(concentrations);
        let norm = jac
            .row_iter()
            .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
            .fold(0.0, f64::max);
        norm * duration
    }

    /// Domain check of a computed state
    pub fn check_state(&self, concentrations: &Concentrations) -> Result<(), String> {
        match fractional_negative_species(concentrations, &self.orders) {
            Some(s) => Err(format!(
                "concentration of {} is negative ({:e} mol/L) while its order {} is fractional",
                s,
                concentrations[s],
                self.orders.order_of(s).unwrap_or(0.0)
            )),
            None => Ok(()),
        }
    }
}
