//! Report sinks.
//!
//! The engine hands each [`ReportRow`] to a [`ReportSink`]. [`TsvRecorder`]
//! writes the tab-separated time series; [`MemoryRecorder`] keeps rows in
//! memory so parallel repetitions can be written out in order afterwards.

use crate::base::all_genotypes;
use crate::errors::ReportError;
use crate::storage::types::{PoolStats, ReportRow};
use std::io::Write;

/// Destination for report rows.
pub trait ReportSink {
    fn record(&mut self, row: &ReportRow) -> Result<(), ReportError>;

    fn flush(&mut self) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Column names of the time series, in order.
pub fn header() -> Vec<String> {
    let genotypes: Vec<String> = all_genotypes().iter().map(|g| g.code()).collect();
    let mut columns: Vec<String> = [
        "round",
        "time",
        "initial_release",
        "pop",
        "fpop",
        "eggs",
        "feggs",
        "output",
        "foutput",
        "fitness",
        "WT",
        "transgenes",
        "drives",
        "anti",
        "resistance",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    columns.extend(genotypes.iter().cloned());
    columns.extend(genotypes.iter().map(|g| format!("{g}.eggs")));
    columns.extend(
        [
            "WT.output",
            "transgenes.output",
            "drives.output",
            "anti.output",
            "resistance.output",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    columns.extend(genotypes.iter().map(|g| format!("{g}.output")));
    columns
}

/// Float formatting for report cells: `nan` for missing values, a trailing
/// `.0` on whole numbers.
fn format_value(value: Option<f64>) -> String {
    match value {
        None => "nan".to_string(),
        Some(v) if v.is_nan() => "nan".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{v:.1}"),
        Some(v) => format!("{v}"),
    }
}

fn push_classes(cells: &mut Vec<String>, stats: &PoolStats) {
    for count in [
        stats.wild_type,
        stats.transgenes,
        stats.drives,
        stats.anti,
        stats.resistance,
    ] {
        cells.push(format_value(stats.frequency(count)));
    }
}

fn push_genotypes(cells: &mut Vec<String>, stats: &PoolStats) {
    for &count in &stats.genotypes {
        cells.push(format_value(stats.frequency(count)));
    }
}

/// Render a row as its cells, in [`header`] order.
pub fn format_row(row: &ReportRow) -> Vec<String> {
    let mut cells = vec![
        row.round.to_string(),
        format!("{:.1}", row.time),
        if row.initial_release { "True" } else { "False" }.to_string(),
        row.population.size.to_string(),
        row.population.females.to_string(),
        row.eggs.size.to_string(),
        row.eggs.females.to_string(),
        row.output.size.to_string(),
        row.output.females.to_string(),
    ];
    if row.population.size > 0 {
        cells.push(format_value(row.population.fitness()));
    } else {
        cells.push(format_value(None));
    }
    push_classes(&mut cells, &row.population);
    push_genotypes(&mut cells, &row.population);
    push_genotypes(&mut cells, &row.eggs);
    push_classes(&mut cells, &row.output);
    push_genotypes(&mut cells, &row.output);
    cells
}

/// Writes rows as tab-separated lines, with the header first.
pub struct TsvRecorder<W: Write> {
    writer: W,
    header_written: bool,
    rows_written: usize,
}

impl<W: Write> TsvRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            rows_written: 0,
        }
    }

    /// Write the header line. Called automatically before the first row.
    pub fn write_header(&mut self) -> Result<(), ReportError> {
        if !self.header_written {
            writeln!(self.writer, "{}", header().join("\t"))?;
            self.header_written = true;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for TsvRecorder<W> {
    fn record(&mut self, row: &ReportRow) -> Result<(), ReportError> {
        self.write_header()?;
        writeln!(self.writer, "{}", format_row(row).join("\t"))?;
        self.rows_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every row in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecorder {
    rows: Vec<ReportRow>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ReportRow> {
        self.rows
    }
}

impl ReportSink for MemoryRecorder {
    fn record(&mut self, row: &ReportRow) -> Result<(), ReportError> {
        self.rows.push(row.clone());
        Ok(())
    }
}
