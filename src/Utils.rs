/// eng
/// CSV export and import of trajectories with unit-labelled headers
pub mod export;
/// selection of concentration series to be plotted
pub mod plot_series;
