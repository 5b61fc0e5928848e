use crate::Kinetics::batch_kinetics::{
    Concentrations, KineticParameters, ReactorConditions, Species, rate_constant,
};
use crate::ReactorsIVP::BatchReactorIVP::BatchReactorTask;
use crate::ReactorsIVP::batch_reactor_pretty_print::trajectory_table;
use crate::ReactorsIVP::batch_reactor_solver::{IntegratorMethod, IntegratorOptions};
use crate::Utils::plot_series::{plot_series_terminal, print_series_summary, select_series};
use prettytable::{Table, row};

pub fn batch_examples(task: usize) {
    match task {
        0 => {
            // A + B => C + D, second order overall; with CB = CA + 2 the exact solution is
            // CA(t) = 2/(1.4*exp(2kt) - 1)
            let mut reactor = BatchReactorTask::new();
            reactor.set_problem_name("reference reaction");
            reactor.set_sample_count(11);
            reactor.pretty_print_task();
            match reactor.solve() {
                Ok(()) => {
                    let k = rate_constant(&reactor.conditions, &reactor.parameters);
                    let mut table = Table::new();
                    table.add_row(row!["time (min)", "CA numeric", "CA exact", "CA + CC"]);
                    if let Some(trajectory) = reactor.get_trajectory() {
                        for i in 0..trajectory.len() {
                            let t = trajectory.t[i];
                            let c = trajectory.sample(i);
                            table.add_row(row![
                                format!("{:.2}", t),
                                format!("{:.10}", c[Species::A]),
                                format!("{:.10}", 2.0 / (1.4 * (2.0 * k * t).exp() - 1.0)),
                                format!("{:.10}", c[Species::A] + c[Species::C])
                            ]);
                        }
                    }
                    table.printstd();
                    reactor.pretty_print_results();
                }
                Err(e) => println!("Error: {}", e),
            }
        }
        1 => {
            // constant rate: concentrations are not clamped at zero
            let mut reactor = BatchReactorTask::new();
            reactor.set_reaction_orders(0.0, 0.0);
            reactor.set_kinetic_parameters(1.0, 0.0);
            reactor.set_duration(10.0);
            reactor.set_sample_count(11);
            match reactor.solve() {
                Ok(()) => {
                    if let Some(trajectory) = reactor.get_trajectory() {
                        trajectory_table(trajectory).printstd();
                        let series = select_series(trajectory, &Species::ALL);
                        plot_series_terminal(&series);
                        print_series_summary(&series);
                    }
                }
                Err(e) => println!("Error: {}", e),
            }
        }
        2 => {
            // k = 1e6: Auto sees the stiffness indicator far above the threshold and picks BDF
            let mut reactor = BatchReactorTask::new();
            reactor.set_kinetic_parameters(1e6, 0.0);
            for method in [IntegratorMethod::Auto, IntegratorMethod::Stiff, IntegratorMethod::Radau] {
                reactor.set_solver_options(IntegratorOptions {
                    method,
                    ..Default::default()
                });
                println!("\nmethod: {:?}", method);
                match reactor.solve() {
                    Ok(()) => reactor.pretty_print_results(),
                    Err(e) => println!("Error: {}", e),
                }
            }
            reactor.set_solver_options(IntegratorOptions {
                method: IntegratorMethod::NonStiff,
                max_steps: 2000,
                ..Default::default()
            });
            match reactor.solve() {
                Ok(()) => println!("explicit method finished within 2000 iterations"),
                Err(e) => println!("explicit method alone: {}", e),
            }
        }
        3 => {
            let parameters = KineticParameters::new(100.0, 30_000.0);
            let mut table = Table::new();
            table.add_row(row!["T (C)", "k", "CA after 100 min"]);
            for Tc in [0.0, 25.0, 50.0, 100.0, 200.0] {
                let mut reactor = BatchReactorTask::new();
                reactor.set_temperature(Tc);
                reactor.set_sample_count(2);
                let k = rate_constant(&ReactorConditions::new(Tc), &parameters);
                let CA = match reactor.solve() {
                    Ok(()) => reactor
                        .get_trajectory()
                        .and_then(|t| t.final_state())
                        .map(|c| format!("{:.6}", c[Species::A]))
                        .unwrap_or_default(),
                    Err(e) => e.to_string(),
                };
                table.add_row(row![Tc, format!("{:.4e}", k), CA]);
            }
            table.printstd();
        }
        4 => {
            // sqrt(CA) runs A out in finite time, the run reports a failure once A turns negative
            let mut reactor = BatchReactorTask::new();
            reactor.set_initial_concentrations(Concentrations::new(1.0, 7.0, 0.0, 0.0));
            reactor.set_reaction_orders(0.5, 1.0);
            reactor.set_kinetic_parameters(1.0, 0.0);
            reactor.set_duration(2.0);
            reactor.set_sample_count(21);
            reactor.set_solver_options(IntegratorOptions {
                method: IntegratorMethod::Stiff,
                rtol: 1e-6,
                atol: 1e-9,
                ..Default::default()
            });
            match reactor.solve() {
                Ok(()) => reactor.pretty_print_results(),
                Err(e) => println!("Error: {}", e),
            }
        }
        _ => println!("No example number {}", task),
    }
}
