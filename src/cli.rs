/// interactive terminal menu of the simulator
pub mod cli_main;
/// menu of the worked examples
pub mod cli_examples;
