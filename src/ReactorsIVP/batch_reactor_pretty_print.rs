//! # Pretty Printing Module for Batch Reactor Tasks
//!
//! Formatted terminal output of the reactor inputs, the solver statistics and the
//! concentration table. All output is formatted with prettytable.
use super::BatchReactorIVP::{BatchReactorTask, Trajectory};
use crate::Kinetics::batch_kinetics::{Species, rate_constant};
use prettytable::{Cell, Row, Table, row};

/// Table with the columns time, A, B, C, D and one row per sample
pub fn trajectory_table(trajectory: &Trajectory) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("time")];
    header.extend(Species::ALL.iter().map(|s| Cell::new(s.key())));
    table.add_row(Row::new(header));
    for i in 0..trajectory.len() {
        let sample = trajectory.sample(i);
        let mut cells = vec![Cell::new(&format!("{:.4}", trajectory.t[i]))];
        cells.extend(
            Species::ALL
                .iter()
                .map(|s| Cell::new(&format!("{:.6}", sample[*s]))),
        );
        table.add_row(Row::new(cells));
    }
    table
}

impl BatchReactorTask {
    /// Displays the inputs of the task
    pub fn pretty_print_task(&self) {
        println!("\n=== BATCH REACTOR TASK ===");
        println!("Problem Name: {:?}", self.problem_name);
        println!("Reaction: A + B => C + D");

        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        table.add_row(row!["Temperature (Tc)", format!("{:.2}", self.conditions.Tc), "C"]);
        table.add_row(row!["Duration", format!("{}", self.duration), "min"]);
        table.add_row(row!["Samples", self.sample_count, "-"]);
        table.add_row(row!["Order of A (nA)", self.orders.nA, "-"]);
        table.add_row(row!["Order of B (nB)", self.orders.nB, "-"]);
        table.add_row(row!["Pre-exponential factor (k0)", format!("{:.4e}", self.parameters.k0), "mol/L s"]);
        table.add_row(row!["Activation energy (Ea)", format!("{:.1}", self.parameters.Ea), "J/mol"]);
        table.add_row(row![
            "Rate constant (k)",
            format!("{:.4e}", rate_constant(&self.conditions, &self.parameters)),
            "-"
        ]);
        for s in Species::ALL {
            table.add_row(row![
                format!("Initial {}", s.key()),
                format!("{}", self.initial[s]),
                "mol/L"
            ]);
        }
        println!("\nInputs:");
        table.printstd();

        let mut solver = Table::new();
        solver.add_row(row!["Solver option", "Value"]);
        solver.add_row(row!["method", format!("{:?}", self.options.method)]);
        solver.add_row(row!["rtol", format!("{:e}", self.options.rtol)]);
        solver.add_row(row!["atol", format!("{:e}", self.options.atol)]);
        solver.add_row(row!["max iterations", self.options.max_steps]);
        solver.add_row(row![
            "wall-clock limit",
            match self.options.max_wall_time {
                Some(limit) => format!("{:?}", limit),
                None => "none".to_string(),
            }
        ]);
        println!("\nSolver:");
        solver.printstd();
    }

    /// Displays the last trajectory and the integration statistics
    pub fn pretty_print_results(&self) {
        let Some(trajectory) = self.get_trajectory() else {
            println!("No results yet. Call solve() first.");
            return;
        };
        println!("\n=== BATCH REACTOR RESULTS ===");
        trajectory_table(trajectory).printstd();

        let stats = &trajectory.stats;
        let mut table = Table::new();
        table.add_row(row!["Statistic", "Value"]);
        table.add_row(row!["solver", stats.solver]);
        table.add_row(row!["solver points", stats.solver_points]);
        table.add_row(row!["stiffness indicator", format!("{:.3e}", stats.stiffness_indicator)]);
        table.add_row(row!["wall time", format!("{:?}", stats.wall_time)]);
        table.printstd();
    }
}
