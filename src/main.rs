use BatchReactor::cli::cli_main::run_interactive_menu;
use BatchReactor::settings::{DEFAULT_SETTINGS_FILE, SimulationSettings};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

pub fn main() {
    let (settings, load_error) = match SimulationSettings::load_or_default(DEFAULT_SETTINGS_FILE) {
        Ok(settings) => (settings, None),
        Err(e) => (SimulationSettings::default(), Some(e)),
    };
    if let Err(e) = TermLogger::init(
        settings.log_level_filter(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("logger initialization failed: {}", e);
    }
    if let Some(e) = load_error {
        log::warn!("{} could not be read ({}), using defaults", DEFAULT_SETTINGS_FILE, e);
    }
    if let Err(e) = run_interactive_menu(settings, DEFAULT_SETTINGS_FILE) {
        log::error!("terminal I/O failed: {}", e);
        std::process::exit(1);
    }
}
