/// eng
/// Isothermal batch reactor with the single reaction A + B => C + D: validation of the inputs,
/// integration of the kinetic model on an evenly spaced time grid and a task object that keeps
/// the last solution for display and export.
///
/// # Examples
/// ```
/// use BatchReactor::Kinetics::batch_kinetics::{
///     Concentrations, KineticParameters, ReactionOrders, ReactorConditions, Species,
/// };
/// use BatchReactor::ReactorsIVP::BatchReactorIVP::solve_trajectory;
/// let trajectory = solve_trajectory(
///     &Concentrations::new(5.0, 7.0, 0.5, 0.0),
///     &ReactorConditions::new(50.0),
///     &ReactionOrders::new(1.0, 1.0),
///     &KineticParameters::new(100.0, 30_000.0),
///     100.0,
///     100,
/// )
/// .unwrap();
/// assert_eq!(trajectory.len(), 100);
/// assert!(trajectory.column(Species::A)[99] < 5.0);
/// ```
pub mod BatchReactorIVP;
/// RustedSciThe ODE solvers: method choice, solver parameters, output checks and resampling
pub mod batch_reactor_solver;
/// tables of inputs and results
pub mod batch_reactor_pretty_print;
