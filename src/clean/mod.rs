// src/clean/mod.rs
pub mod date_parser;
pub mod fill;
pub mod filter;

use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Date32Builder, StringArray},
    compute::cast,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{debug, info};

pub use fill::fill_nulls;
pub use filter::{filter_countries, string_column};

/// The countries the analysis is restricted to, in plotting order.
pub const COUNTRIES: [&str; 3] = ["Kenya", "United States", "India"];

/// Name of the date column in the dataset.
pub const DATE_COLUMN: &str = "date";

/// Convert `column` to `Date32`. Nulls stay null; an unparseable value is an error.
pub fn parse_dates(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let idx = batch
        .schema_ref()
        .index_of(column)
        .map_err(|_| anyhow!("column `{}` not found", column))?;
    let arr = batch.column(idx);

    let parsed: ArrayRef = match arr.data_type() {
        DataType::Date32 => arr.clone(),
        DataType::Date64 | DataType::Timestamp(_, _) => cast(arr, &DataType::Date32)
            .with_context(|| format!("Failed to convert `{}` to dates", column))?,
        DataType::Utf8 => {
            let sarr = arr
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("column `{}` is not a string array", column))?;
            let mut b = Date32Builder::with_capacity(sarr.len());
            for (row, opt) in sarr.iter().enumerate() {
                match opt {
                    Some(raw) => {
                        let date = date_parser::parse_date(raw).ok_or_else(|| {
                            anyhow!("unparseable date {:?} in `{}` at row {}", raw, column, row)
                        })?;
                        b.append_value(date_parser::days_since_epoch(date));
                    }
                    None => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Null => cast(arr, &DataType::Date32)?,
        other => bail!("column `{}` has type {:?}, expected dates", column, other),
    };

    let mut fields: Vec<Field> = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields[idx] = Field::new(column, DataType::Date32, true);

    let mut cols = batch.columns().to_vec();
    cols[idx] = parsed;
    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).map_err(Into::into)
}

/// Filter to `countries`, parse the date column, then zero-fill every null.
pub fn clean(batch: &RecordBatch, countries: &[&str]) -> Result<RecordBatch> {
    let filtered = filter_countries(batch, countries)?;
    info!(
        before = batch.num_rows(),
        after = filtered.num_rows(),
        "filtered to {:?}",
        countries
    );

    let dated = parse_dates(&filtered, DATE_COLUMN)?;
    debug!("parsed `{}` as Date32", DATE_COLUMN);

    let filled = fill_nulls(&dated)?;
    debug!(rows = filled.num_rows(), "zero-filled nulls");
    Ok(filled)
}
