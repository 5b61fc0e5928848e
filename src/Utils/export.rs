//! Spreadsheet export of reactor trajectories.
//!
//! The file is a CSV table with the header
//! `time (min),A (mol/L),B (mol/L),C (mol/L),D (mol/L)` and one row per sample.
//! Floats are written in the shortest form that parses back to the same value.
use crate::Kinetics::batch_kinetics::{Concentrations, Species};
use crate::ReactorsIVP::BatchReactorIVP::Trajectory;
use csv::{ReaderBuilder, Writer};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

pub const TIME_HEADER: &str = "time (min)";
pub const DEFAULT_EXPORT_FILE: &str = "batch_reactor_results.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: run a simulation first")]
    NoTrajectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unexpected table layout: {0}")]
    Layout(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct TrajectoryRecord {
    #[serde(rename = "time (min)")]
    time: f64,
    #[serde(rename = "A (mol/L)")]
    A: f64,
    #[serde(rename = "B (mol/L)")]
    B: f64,
    #[serde(rename = "C (mol/L)")]
    C: f64,
    #[serde(rename = "D (mol/L)")]
    D: f64,
}

/// header line of the exported table
pub fn column_headers() -> Vec<String> {
    let mut headers = vec![TIME_HEADER.to_string()];
    headers.extend(Species::ALL.iter().map(|s| s.column_header()));
    headers
}

pub fn write_trajectory_csv<W: Write>(trajectory: &Trajectory, writer: W) -> Result<(), ExportError> {
    let mut wtr = Writer::from_writer(writer);
    for i in 0..trajectory.len() {
        let c = trajectory.sample(i);
        wtr.serialize(TrajectoryRecord {
            time: trajectory.t[i],
            A: c[Species::A],
            B: c[Species::B],
            C: c[Species::C],
            D: c[Species::D],
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_trajectory_csv<P: AsRef<Path>>(
    trajectory: &Trajectory,
    path: P,
) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_trajectory_csv(trajectory, file)?;
    info!(
        "exported {} samples to {}",
        trajectory.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn read_trajectory_csv<R: Read>(reader: R) -> Result<Trajectory, ExportError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers != column_headers() {
        return Err(ExportError::Layout(format!(
            "expected columns {:?}, found {:?}",
            column_headers(),
            headers
        )));
    }
    let mut t = Vec::new();
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        let r: TrajectoryRecord = record?;
        t.push(r.time);
        rows.push(Concentrations::new(r.A, r.B, r.C, r.D));
    }
    if rows.is_empty() {
        return Err(ExportError::Layout("table has no rows".to_string()));
    }
    Ok(Trajectory::from_rows(t, &rows))
}

pub fn import_trajectory_csv<P: AsRef<Path>>(path: P) -> Result<Trajectory, ExportError> {
    let file = File::open(path.as_ref())?;
    let trajectory = read_trajectory_csv(file)?;
    info!(
        "imported {} samples from {}",
        trajectory.len(),
        path.as_ref().display()
    );
    Ok(trajectory)
}
