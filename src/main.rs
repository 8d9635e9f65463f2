use anyhow::Result;
use clap::Parser;
use covid_explorer::{pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) config ───────────────────────────────────────────────────
    let cfg = Config::parse();
    info!(input = %cfg.input.display(), out_dir = %cfg.out_dir.display(), "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    let report = pipeline::run(&cfg)?;
    info!(
        loaded = report.loaded_rows,
        cleaned = report.cleaned_rows,
        charts = report.charts.len(),
        choropleth = report.choropleth.is_some(),
        "finished"
    );
    Ok(())
}
