//! Selection of concentration series and their terminal plot.
use crate::Kinetics::batch_kinetics::Species;
use crate::ReactorsIVP::BatchReactorIVP::Trajectory;
use RustedSciThe::Utils::plots::plots_terminal;
use nalgebra::{DMatrix, DVector};

/// One curve: `(time, concentration)` points of a single species
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesSeries {
    pub species: Species,
    /// legend entry, "Conc A"
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl SpeciesSeries {
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|(_, c)| *c).fold(None, |acc, c| match acc {
            None => Some((c, c)),
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
        })
    }
}

/// One series per selected species in selection order. Repeated keys are drawn once.
pub fn select_series(trajectory: &Trajectory, selection: &[Species]) -> Vec<SpeciesSeries> {
    let mut seen: Vec<Species> = Vec::with_capacity(selection.len());
    for s in selection {
        if !seen.contains(s) {
            seen.push(*s);
        }
    }
    seen.into_iter()
        .map(|species| SpeciesSeries {
            species,
            name: species.label(),
            points: trajectory
                .t
                .iter()
                .copied()
                .zip(trajectory.column(species))
                .collect(),
        })
        .collect()
}

/// Parses "A, C" or "a c" into species keys. An empty string selects nothing.
pub fn parse_species_selection(input: &str) -> Result<Vec<Species>, String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<Species>())
        .collect()
}

/// Shared time axis, one column per series and the legend names, `None` for an empty selection
pub fn series_matrix(series: &[SpeciesSeries]) -> Option<(DVector<f64>, DMatrix<f64>, Vec<String>)> {
    let first = series.first()?;
    let t = DVector::from_iterator(first.points.len(), first.points.iter().map(|p| p.0));
    let y = DMatrix::from_fn(t.len(), series.len(), |i, j| series[j].points[i].1);
    let names = series.iter().map(|s| s.name.clone()).collect();
    Some((t, y, names))
}

/// Draws the chosen series in the terminal, time on the horizontal axis
pub fn plot_series_terminal(series: &[SpeciesSeries]) {
    match series_matrix(series) {
        Some((t, y, names)) => plots_terminal("time (min)".to_string(), names, t, y),
        None => println!("No species selected for plotting."),
    }
}

/// Short terminal summary of the chosen series
pub fn print_series_summary(series: &[SpeciesSeries]) {
    if series.is_empty() {
        println!("No species selected for plotting.");
        return;
    }
    for s in series {
        let first = s.points.first().map(|p| p.1).unwrap_or(f64::NAN);
        let last = s.points.last().map(|p| p.1).unwrap_or(f64::NAN);
        let (lo, hi) = s.min_max().unwrap_or((f64::NAN, f64::NAN));
        println!(
            "{}: start {:.6}, end {:.6}, min {:.6}, max {:.6} ({} points)",
            s.name,
            first,
            last,
            lo,
            hi,
            s.points.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::batch_kinetics::Concentrations;

    fn trajectory() -> Trajectory {
        Trajectory::from_rows(
            vec![0.0, 1.0],
            &[
                Concentrations::new(5.0, 7.0, 0.5, 0.0),
                Concentrations::new(4.0, 6.0, 1.5, 1.0),
            ],
        )
    }

    #[test]
    fn test_default_selection() {
        let series = select_series(&trajectory(), &[Species::A, Species::B]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Conc A");
        assert_eq!(series[1].name, "Conc B");
        assert_eq!(series[0].points, vec![(0.0, 5.0), (1.0, 4.0)]);
        assert_eq!(series[1].min_max(), Some((6.0, 7.0)));
    }

    #[test]
    fn test_empty_selection_draws_nothing() {
        assert!(select_series(&trajectory(), &[]).is_empty());
    }

    #[test]
    fn test_selection_order_and_duplicates() {
        let series = select_series(&trajectory(), &[Species::D, Species::A, Species::D]);
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Conc D", "Conc A"]);
    }

    #[test]
    fn test_series_matrix_columns_follow_selection() {
        let series = select_series(&trajectory(), &[Species::C, Species::A]);
        let (t, y, names) = series_matrix(&series).unwrap();
        assert_eq!(t.as_slice(), &[0.0, 1.0]);
        assert_eq!(y.shape(), (2, 2));
        assert_eq!(y.column(0).iter().copied().collect::<Vec<f64>>(), vec![0.5, 1.5]);
        assert_eq!(y.column(1).iter().copied().collect::<Vec<f64>>(), vec![5.0, 4.0]);
        assert_eq!(names, vec!["Conc C".to_string(), "Conc A".to_string()]);
        assert!(series_matrix(&[]).is_none());
    }

    #[test]
    fn test_plot_selected_series() {
        let series = select_series(&trajectory(), &[Species::A, Species::D]);
        plot_series_terminal(&series);
        plot_series_terminal(&[]);
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_species_selection("a, C d"),
            Ok(vec![Species::A, Species::C, Species::D])
        );
        assert_eq!(parse_species_selection("  "), Ok(vec![]));
        assert!(parse_species_selection("A, Q").is_err());
    }
}
