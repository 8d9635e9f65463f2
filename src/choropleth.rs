//! World map of the most recent case counts, written as a Plotly figure.
//!
//! Only compiled with the `choropleth` feature.

use crate::clean::{date_parser, string_column, DATE_COLUMN};
use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, AsArray, BooleanArray},
    compute::{cast, filter_record_batch, max},
    datatypes::{DataType, Date32Type, Float64Type},
    record_batch::RecordBatch,
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub const FILE_NAME: &str = "global_total_cases.html";
const TITLE: &str = "Global COVID-19 Total Cases";
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    pub text: Vec<String>,
    pub colorscale: &'static str,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Layout {
    pub title: Title,
}

#[derive(Debug, Serialize)]
pub struct Title {
    pub text: &'static str,
}

/// Rows whose date equals the table's maximum date.
///
/// A country with no row on that exact day is absent from the result.
pub fn latest_snapshot(batch: &RecordBatch) -> Result<RecordBatch> {
    let dates = batch
        .column_by_name(DATE_COLUMN)
        .ok_or_else(|| anyhow!("column `{}` not found", DATE_COLUMN))?
        .as_primitive_opt::<Date32Type>()
        .ok_or_else(|| anyhow!("column `{}` is not Date32", DATE_COLUMN))?;

    let Some(latest) = max(dates) else {
        return Ok(batch.slice(0, 0));
    };
    debug!(latest = ?date_parser::date_from_days(latest), "latest date");

    let mask: BooleanArray = dates.iter().map(|d| Some(d == Some(latest))).collect();
    filter_record_batch(batch, &mask).context("Failed to select latest rows")
}

/// Build the figure from a snapshot: `iso_code` locates, `total_cases` colours,
/// `location` labels.
pub fn build_figure(snapshot: &RecordBatch) -> Result<Figure> {
    let iso = string_column(snapshot, "iso_code")?;
    let location = string_column(snapshot, "location")?;
    let cases = snapshot
        .column_by_name("total_cases")
        .ok_or_else(|| anyhow!("column `total_cases` not found"))?;
    let cases = cast(cases, &DataType::Float64).context("column `total_cases` is not numeric")?;
    let cases = cases.as_primitive::<Float64Type>();

    let mut trace = Trace {
        kind: "choropleth",
        locations: Vec::with_capacity(snapshot.num_rows()),
        z: Vec::with_capacity(snapshot.num_rows()),
        text: Vec::with_capacity(snapshot.num_rows()),
        colorscale: "Reds",
        hovertemplate: "<b>%{text}</b><br>total_cases=%{z}<extra></extra>",
    };
    for row in 0..snapshot.num_rows() {
        trace.locations.push(iso.value(row).to_string());
        trace.text.push(location.value(row).to_string());
        trace.z.push(if cases.is_null(row) { 0.0 } else { cases.value(row) });
    }

    Ok(Figure {
        data: vec![trace],
        layout: Layout {
            title: Title { text: TITLE },
        },
    })
}

fn to_html(figure: &Figure) -> Result<String> {
    // a `</script>` inside a string value would close the inline script
    let json = serde_json::to_string(figure)?.replace("</", "<\\/");
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="map" style="width:100%;height:90vh;"></div>
<script>
const figure = {json};
Plotly.newPlot("map", figure.data, figure.layout);
</script>
</body>
</html>
"#,
        title = TITLE,
        cdn = PLOTLY_CDN,
        json = json
    ))
}

/// Write the latest-date choropleth into `out_dir`.
pub fn render_latest(batch: &RecordBatch, out_dir: &Path) -> Result<PathBuf> {
    let snapshot = latest_snapshot(batch)?;
    let figure = build_figure(&snapshot)?;
    let path = out_dir.join(FILE_NAME);
    fs::write(&path, to_html(&figure)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(rows = snapshot.num_rows(), path = %path.display(), "choropleth written");
    Ok(path)
}
