pub mod chart;
#[cfg(feature = "choropleth")]
pub mod choropleth;
pub mod clean;
pub mod config;
pub mod insights;
pub mod inspect;
pub mod load;
pub mod pipeline;

pub use clean::COUNTRIES;
pub use config::Config;
