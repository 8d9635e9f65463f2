use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "covid-explorer")]
#[command(about = "Filter the OWID COVID-19 dataset to three countries and chart it")]
pub struct Config {
    /// Input CSV file
    #[arg(short, long, default_value = "owid-covid-data.csv")]
    pub input: PathBuf,

    /// Directory the charts are written to (created if missing)
    #[arg(short, long, default_value = "charts")]
    pub out_dir: PathBuf,

    /// Rows shown in the dataset preview
    #[arg(long, default_value_t = 5)]
    pub head_rows: usize,
}
