use crate::{chart, clean, config::Config, insights, inspect, load, COUNTRIES};
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub loaded_rows: usize,
    pub cleaned_rows: usize,
    pub charts: Vec<PathBuf>,
    /// `None` when the choropleth is compiled out.
    pub choropleth: Option<PathBuf>,
}

/// Write the choropleth when `enabled`; `run` passes whether the feature is compiled in.
fn render_choropleth(
    batch: &RecordBatch,
    out_dir: &Path,
    enabled: bool,
) -> Result<Option<PathBuf>> {
    if !enabled {
        return Ok(None);
    }
    #[cfg(feature = "choropleth")]
    let written = Some(crate::choropleth::render_latest(batch, out_dir)?);
    #[cfg(not(feature = "choropleth"))]
    let written = {
        let _ = (batch, out_dir);
        None
    };
    Ok(written)
}

/// Load, inspect, clean, chart and print insights, in that order.
pub fn run(cfg: &Config) -> Result<RunReport> {
    let start = Instant::now();
    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("Failed to create {}", cfg.out_dir.display()))?;

    // ─── 1) load ─────────────────────────────────────────────────────
    let raw = load::load_csv(&cfg.input)?;
    info!(
        rows = raw.num_rows(),
        columns = raw.num_columns(),
        "loaded {}",
        cfg.input.display()
    );

    // ─── 2) inspect ──────────────────────────────────────────────────
    inspect::print_overview(&raw, cfg.head_rows)?;

    // ─── 3) filter, parse dates, zero-fill ───────────────────────────
    let cleaned = clean::clean(&raw, &COUNTRIES)?;

    // ─── 4) line charts ──────────────────────────────────────────────
    let charts = chart::render_all(&cleaned, &COUNTRIES, &cfg.out_dir)?;

    // ─── 5) choropleth, when compiled in ─────────────────────────────
    let choropleth = render_choropleth(&cleaned, &cfg.out_dir, cfg!(feature = "choropleth"))?;

    // ─── 6) insights ─────────────────────────────────────────────────
    insights::print();

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(RunReport {
        loaded_rows: raw.num_rows(),
        cleaned_rows: cleaned.num_rows(),
        charts,
        choropleth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,covid_explorer=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const DATASET: &str = "iso_code,continent,location,date,total_cases,total_deaths,total_vaccinations
KEN,Africa,Kenya,2021-05-01,160000,2800,
KEN,Africa,Kenya,2021-05-02,160500,2810,1000.0
FRA,Europe,France,2021-05-02,5600000,105000,18000000.0
IND,Asia,India,2021-05-01,19100000,211000,150000000.0
IND,Asia,India,2021-05-02,,,
USA,North America,United States,2021-05-02,32400000,577000,245000000.0
";

    fn config_in(dir: &std::path::Path) -> Result<Config> {
        let input = dir.join("owid-covid-data.csv");
        fs::File::create(&input)?.write_all(DATASET.as_bytes())?;
        Ok(Config {
            input,
            out_dir: dir.join("charts"),
            head_rows: 5,
        })
    }

    #[test]
    fn end_to_end() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let cfg = config_in(dir.path())?;

        let report = run(&cfg)?;

        assert_eq!(report.loaded_rows, 6);
        assert_eq!(report.cleaned_rows, 5);
        assert!(report.cleaned_rows <= report.loaded_rows);
        assert_eq!(report.charts.len(), 3);
        for path in &report.charts {
            assert!(path.starts_with(&cfg.out_dir));
            assert!(path.is_file());
        }
        Ok(())
    }

    #[cfg(feature = "choropleth")]
    #[test]
    fn writes_choropleth_when_enabled() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let report = run(&config_in(dir.path())?)?;
        let path = report.choropleth.expect("choropleth enabled");
        assert!(path.is_file());
        Ok(())
    }

    #[cfg(not(feature = "choropleth"))]
    #[test]
    fn skips_choropleth_when_disabled() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let cfg = config_in(dir.path())?;
        let report = run(&cfg)?;
        assert!(report.choropleth.is_none());
        assert_eq!(fs::read_dir(&cfg.out_dir)?.count(), 3);
        Ok(())
    }

    #[test]
    fn disabled_choropleth_is_skipped() -> Result<()> {
        let dir = tempdir()?;
        let cfg = config_in(dir.path())?;
        let raw = load::load_csv(&cfg.input)?;
        let cleaned = clean::clean(&raw, &COUNTRIES)?;
        fs::create_dir_all(&cfg.out_dir)?;

        assert!(render_choropleth(&cleaned, &cfg.out_dir, false)?.is_none());
        assert_eq!(fs::read_dir(&cfg.out_dir)?.count(), 0);
        Ok(())
    }

    #[test]
    fn header_only_input_runs_to_completion() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("owid-covid-data.csv");
        fs::write(
            &input,
            "iso_code,continent,location,date,total_cases,total_deaths,total_vaccinations\n",
        )?;
        let cfg = Config {
            input,
            out_dir: dir.path().join("charts"),
            head_rows: 5,
        };

        let report = run(&cfg)?;
        assert_eq!(report.loaded_rows, 0);
        assert_eq!(report.cleaned_rows, 0);
        assert_eq!(report.charts.len(), 3);
        Ok(())
    }

    #[test]
    fn missing_input_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let cfg = Config {
            input: dir.path().join("absent.csv"),
            out_dir: dir.path().join("charts"),
            head_rows: 5,
        };
        assert!(run(&cfg).is_err());
        Ok(())
    }
}
