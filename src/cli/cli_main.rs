use super::cli_examples::examples_menu;
use crate::ReactorsIVP::BatchReactorIVP::BatchReactorTask;
use crate::Utils::plot_series::{
    parse_species_selection, plot_series_terminal, print_series_summary, select_series,
};
use crate::ReactorsIVP::batch_reactor_solver::IntegratorMethod;
use crate::settings::SimulationSettings;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Main loop. Settings are edited in memory and written only on request.
pub fn run_interactive_menu<P: AsRef<Path>>(
    mut settings: SimulationSettings,
    settings_path: P,
) -> io::Result<()> {
    let settings_path = settings_path.as_ref();
    // last solved task, kept for the table and the export
    let mut task: Option<BatchReactorTask> = None;
    loop {
        show_main_menu()?;
        // end of input closes the program like "0"
        let Some(choice) = get_user_input()? else {
            println!("\nGoodbye!");
            break;
        };

        match choice.trim() {
            "1" => task = run_simulation(&settings),
            "2" => edit_parameters_menu(&mut settings)?,
            "3" => choose_plot_species(&mut settings)?,
            "4" => match &task {
                Some(t) => t.pretty_print_results(),
                None => println!("No results yet. Run the simulation first."),
            },
            "5" => match &task {
                Some(t) => match t.save_result(&settings.export_file) {
                    Ok(()) => println!("Results written to {}", settings.export_file),
                    Err(e) => error!("export failed: {}", e),
                },
                None => println!("Nothing to export. Run the simulation first."),
            },
            "6" => {
                if let Err(e) = settings.save(settings_path) {
                    error!("could not save settings: {}", e);
                }
            }
            "7" => match SimulationSettings::load_or_default(settings_path) {
                Ok(loaded) => {
                    settings = loaded;
                    println!("Settings reloaded from {}", settings_path.display());
                }
                Err(e) => error!("could not load settings: {}", e),
            },
            "8" => examples_menu()?,
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
    Ok(())
}

/* colors
Blue (\x1b[34m) - header
Yellow (\x1b[33m) - menu options
Cyan (\x1b[36m) - prompt
Reset (\x1b[0m)
*/
fn show_main_menu() -> io::Result<()> {
    println!("\x1b[34m\n Batch reactor A + B => C + D \n\x1b[0m");
    println!("\x1b[33m1. Run simulation\x1b[0m");
    println!("\x1b[33m2. Edit parameters\x1b[0m");
    println!("\x1b[33m3. Choose species to plot\x1b[0m");
    println!("\x1b[33m4. Show results table\x1b[0m");
    println!("\x1b[33m5. Export results (CSV)\x1b[0m");
    println!("\x1b[33m6. Save settings\x1b[0m");
    println!("\x1b[33m7. Reload settings\x1b[0m");
    println!("\x1b[33m8. Examples\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    io::stdout().flush()
}

/// One line of input, `None` at end of input
pub(crate) fn read_user_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut input = String::new();
    match reader.read_line(&mut input)? {
        0 => Ok(None),
        _ => Ok(Some(input)),
    }
}

pub(crate) fn get_user_input() -> io::Result<Option<String>> {
    read_user_line(&mut io::stdin().lock())
}

fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    Ok(get_user_input()?.map(|s| s.trim().to_string()))
}

/// Validates the settings, solves and prints the chosen series
fn run_simulation(settings: &SimulationSettings) -> Option<BatchReactorTask> {
    let mut task = match settings.to_task() {
        Ok(task) => task,
        Err(e) => {
            error!("{}", e);
            return None;
        }
    };
    println!("Solving...");
    if let Err(e) = task.solve() {
        error!("{}", e);
        return None;
    }
    if let Some(trajectory) = task.get_trajectory() {
        info!("{} samples computed", trajectory.len());
        let series = select_series(trajectory, &settings.plot_species);
        plot_series_terminal(&series);
        print_series_summary(&series);
    }
    Some(task)
}

fn print_parameters(settings: &SimulationSettings) {
    let c = settings.initial_concentrations;
    println!("\n=== Parameters ===");
    println!("1. Temperature (C): {}", settings.temperature_C);
    println!("2. Duration (min): {}", settings.duration_min);
    println!("3. Initial A (mol/L): {}", c[0]);
    println!("4. Initial B (mol/L): {}", c[1]);
    println!("5. Initial C (mol/L): {}", c[2]);
    println!("6. Initial D (mol/L): {}", c[3]);
    println!("7. Order of A: {}", settings.reaction_orders[0]);
    println!("8. Order of B: {}", settings.reaction_orders[1]);
    println!("9. log10(k0): {}", settings.log10_k0);
    println!("10. Ea (kJ/mol): {}", settings.Ea_kJ_per_mol);
    println!("11. Number of samples: {}", settings.sample_count);
    println!("12. Solver method (auto/nonstiff/stiff/radau): {:?}", settings.solver.method);
    println!("13. Time limit (s, empty for none): {:?}", settings.solver.timeout_secs);
    println!("14. Export file: {}", settings.export_file);
    println!("0. Back to main menu");
}

/// Applies one edit from the parameters menu
pub(crate) fn apply_parameter(
    settings: &mut SimulationSettings,
    choice: &str,
    value: &str,
) -> Result<(), String> {
    let number = || -> Result<f64, String> {
        value
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", value))
    };
    match choice {
        "1" => settings.temperature_C = number()?,
        "2" => settings.duration_min = number()?,
        "3" | "4" | "5" | "6" => {
            let i = choice.parse::<usize>().map_err(|e| e.to_string())? - 3;
            settings.initial_concentrations[i] = number()?;
        }
        "7" => settings.reaction_orders[0] = number()?,
        "8" => settings.reaction_orders[1] = number()?,
        "9" => settings.log10_k0 = number()?,
        "10" => settings.Ea_kJ_per_mol = number()?,
        "11" => {
            settings.sample_count = value
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not a whole number", value))?
        }
        "12" => {
            settings.solver.method = match value.to_lowercase().as_str() {
                "auto" => IntegratorMethod::Auto,
                "nonstiff" => IntegratorMethod::NonStiff,
                "stiff" => IntegratorMethod::Stiff,
                "radau" => IntegratorMethod::Radau,
                other => return Err(format!("unknown method '{}'", other)),
            }
        }
        "13" => {
            settings.solver.timeout_secs = if value.is_empty() {
                None
            } else {
                Some(number()?)
            }
        }
        "14" => {
            if value.is_empty() {
                return Err("file name is empty".to_string());
            }
            settings.export_file = value.to_string();
        }
        other => return Err(format!("no parameter number {}", other)),
    }
    Ok(())
}

fn edit_parameters_menu(settings: &mut SimulationSettings) -> io::Result<()> {
    loop {
        print_parameters(settings);
        let Some(choice) = prompt("Parameter to change: ")? else {
            break;
        };
        if choice == "0" {
            break;
        }
        let Some(value) = prompt("New value: ")? else {
            break;
        };
        let mut edited = settings.clone();
        match apply_parameter(&mut edited, &choice, &value) {
            // out of range values are rejected here, not at solve time
            Ok(()) => match edited.validate() {
                Ok(()) => *settings = edited,
                Err(e) => error!("{}", e),
            },
            Err(e) => error!("{}", e),
        }
    }
    Ok(())
}

fn choose_plot_species(settings: &mut SimulationSettings) -> io::Result<()> {
    let current: Vec<&str> = settings.plot_species.iter().map(|s| s.key()).collect();
    println!("Currently plotted: {}", current.join(", "));
    let Some(input) = prompt("Species to plot (e.g. A, C; empty for none): ")? else {
        return Ok(());
    };
    match parse_species_selection(&input) {
        Ok(selection) => settings.plot_species = selection,
        Err(e) => error!("{}", e),
    }
    Ok(())
}
