//! One SVG line chart per cumulative metric, a line per country over the
//! date axis.

use crate::clean::{date_parser, string_column, DATE_COLUMN};
use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, AsArray},
    compute::cast,
    datatypes::{DataType, Date32Type, Float64Type},
    record_batch::RecordBatch,
};
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};
use tracing::info;

/// 12x6 inch figure at 100 dpi.
const FIGURE_SIZE: (u32, u32) = (1200, 600);

/// The cumulative measures charted per country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalCases,
    TotalDeaths,
    TotalVaccinations,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::TotalCases,
        Metric::TotalDeaths,
        Metric::TotalVaccinations,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalCases => "total_cases",
            Metric::TotalDeaths => "total_deaths",
            Metric::TotalVaccinations => "total_vaccinations",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::TotalCases => "Total COVID-19 Cases Over Time",
            Metric::TotalDeaths => "Total COVID-19 Deaths Over Time",
            Metric::TotalVaccinations => "Cumulative Vaccinations Over Time",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            Metric::TotalCases => "Total Cases",
            Metric::TotalDeaths => "Total Deaths",
            Metric::TotalVaccinations => "Total Vaccinations",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.svg", self.column())
    }
}

/// `(days since epoch, value)` points for one country, in table order.
pub type Series = Vec<(i32, f64)>;

/// Points of `column` against the date column for rows of `country`.
///
/// Expects a cleaned table: `date` as `Date32`, no nulls. Rows whose value
/// does not read as a number are skipped.
pub fn country_series(batch: &RecordBatch, country: &str, column: &str) -> Result<Series> {
    let location = string_column(batch, "location")?;
    let dates = batch
        .column_by_name(DATE_COLUMN)
        .ok_or_else(|| anyhow!("column `{}` not found", DATE_COLUMN))?;
    let dates = dates
        .as_primitive_opt::<Date32Type>()
        .ok_or_else(|| anyhow!("column `{}` is not Date32", DATE_COLUMN))?;
    let values = batch
        .column_by_name(column)
        .ok_or_else(|| anyhow!("column `{}` not found", column))?;
    let values = cast(values, &DataType::Float64)
        .with_context(|| format!("column `{}` is not numeric", column))?;
    let values = values.as_primitive::<Float64Type>();

    let mut points = Vec::new();
    for row in 0..batch.num_rows() {
        if location.is_null(row) || location.value(row) != country {
            continue;
        }
        if dates.is_null(row) || values.is_null(row) {
            continue;
        }
        points.push((dates.value(row), values.value(row)));
    }
    Ok(points)
}

fn bounds(series: &[(&str, Series)]) -> Option<((i32, i32), f64)> {
    let mut points = series.iter().flat_map(|(_, s)| s.iter());
    let &(d0, v0) = points.next()?;
    let (min_d, max_d, max_v) = points.fold((d0, d0, v0), |(lo, hi, top), &(d, v)| {
        (lo.min(d), hi.max(d), top.max(v))
    });
    Some(((min_d, max_d), max_v))
}

fn format_day(days: &i32) -> String {
    date_parser::date_from_days(*days)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Draw one line per country for `metric` into `path`.
pub fn render_metric(
    batch: &RecordBatch,
    metric: Metric,
    countries: &[&str],
    path: &Path,
) -> Result<()> {
    let series = countries
        .iter()
        .map(|c| Ok((*c, country_series(batch, c, metric.column())?)))
        .collect::<Result<Vec<_>>>()?;

    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let Some(((min_d, max_d), max_v)) = bounds(&series) else {
        root.draw(&Text::new(
            "No data",
            (FIGURE_SIZE.0 as i32 / 2, FIGURE_SIZE.1 as i32 / 2),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))?;
        root.present()?;
        return Ok(());
    };

    // a single date or an all-zero metric still needs a non-empty range
    let max_d = if max_d > min_d { max_d } else { min_d + 1 };
    let top = if max_v > 0.0 { max_v * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(metric.title(), ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(min_d..max_d, 0f64..top)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(metric.y_label())
        .x_label_formatter(&format_day)
        .draw()?;

    for (idx, (country, points)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(*country)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Render every [`Metric`] into `out_dir`, returning the written paths.
pub fn render_all(batch: &RecordBatch, countries: &[&str], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let path = out_dir.join(metric.file_name());
        render_metric(batch, metric, countries, &path)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        info!(metric = metric.column(), path = %path.display(), "chart written");
        written.push(path);
    }
    Ok(written)
}
