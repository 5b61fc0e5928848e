/// eng
/// Rate law of the reaction A + B => C + D: Arrhenius rate constant, power-law rate with
/// arbitrary non-negative orders and the concentration derivatives of all four species.
/// The module also builds the symbolic rate equations for the ODE solver and an analytic Jacobian.
///
///  # Examples
/// ```
/// use BatchReactor::Kinetics::batch_kinetics::{
///     Concentrations, KineticParameters, ReactionOrders, ReactorConditions, Species, rate_derivatives,
/// };
/// let dcdt = rate_derivatives(
///     &Concentrations::new(5.0, 7.0, 0.5, 0.0),
///     &ReactorConditions::new(50.0),
///     &ReactionOrders::new(1.0, 1.0),
///     &KineticParameters::new(100.0, 30_000.0),
/// );
/// assert_eq!(dcdt[Species::A], dcdt[Species::B]);
/// assert_eq!(dcdt[Species::C], -dcdt[Species::A]);
/// ```
pub mod batch_kinetics;
mod batch_kinetics_tests;
