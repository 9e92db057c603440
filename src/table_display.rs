use anyhow::{anyhow, Result};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use std::path::Path;

use crate::api::{PredictItem, Row};
use crate::config::config::DisplayConfig;
use crate::dashboard::DashboardState;

/// Row editor: one line per row, columns in feature order.
pub fn build_rows_table(state: &DashboardState) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec![Cell::new("#").add_attribute(Attribute::Bold)];
    headers.extend(
        state
            .feature_order()
            .iter()
            .map(|f| Cell::new(f).add_attribute(Attribute::Bold)),
    );
    table.set_header(headers);

    for (i, row) in state.rows().iter().enumerate() {
        let mut cells = vec![(i + 1).to_string()];
        cells.extend(state.feature_order().iter().map(|f| match row.get(f) {
            Some(v) => v.to_string(),
            None => "".to_string(),
        }));
        table.add_row(cells);
    }

    table
}

pub fn build_results_table(results: &[PredictItem], display: &DisplayConfig) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Row").add_attribute(Attribute::Bold),
        Cell::new("Score").add_attribute(Attribute::Bold),
        Cell::new("Label").add_attribute(Attribute::Bold),
    ]);

    for item in results {
        let mut label = Cell::new(&item.label);
        if display.use_colors {
            label = label.fg(if item.is_anomaly() {
                Color::Red
            } else {
                Color::Green
            });
        }
        table.add_row(vec![
            Cell::new(item.index),
            Cell::new(format!("{:.*}", display.score_precision, item.score)),
            label,
        ]);
    }

    table
}

pub fn display_rows(state: &DashboardState) {
    println!("{}", format!("Model version: {}", state.model_version()).dark_grey());
    if !state.is_ready() {
        println!("{}", "No features loaded. Run \\features first.".yellow());
        return;
    }
    println!("{}", build_rows_table(state));
}

pub fn display_results(model_version: &str, results: &[PredictItem], display: &DisplayConfig) {
    if results.is_empty() {
        println!("{}", "No results returned.".yellow());
        return;
    }

    println!("{}", build_results_table(results, display));

    let anomalies = results.iter().filter(|r| r.is_anomaly()).count();
    println!(
        "\n{}",
        format!(
            "{} rows scored by model {} ({} anomalies)",
            results.len(),
            model_version,
            anomalies
        )
        .green()
    );
}

pub fn export_results_to_csv(results: &[PredictItem], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["index", "score", "label"])?;
    for item in results {
        wtr.write_record([
            item.index.to_string(),
            item.score.to_string(),
            item.label.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read rows from a CSV whose headers are feature names. Empty cells are
/// skipped so the backend sees them as missing.
pub fn load_rows_from_csv(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let mut row = Row::new();

        for (header, field) in headers.iter().zip(record.iter()) {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let value = field.parse::<f64>().map_err(|_| {
                anyhow!(
                    "line {}: column '{}' value '{}' is not a number",
                    line + 2,
                    header,
                    field
                )
            })?;
            row.insert(header.clone(), value);
        }

        rows.push(row);
    }

    Ok(rows)
}
