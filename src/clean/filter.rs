use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, BooleanArray, StringArray},
    compute::filter_record_batch,
    record_batch::RecordBatch,
};

/// Text column by name, failing with the column name when it is absent or not text.
pub fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column `{}` not found", name))?;
    col.as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow!("column `{}` is {:?}, expected text", name, col.data_type()))
}

/// Keep rows whose `location` is one of `countries`. Null locations are dropped.
pub fn filter_countries(batch: &RecordBatch, countries: &[&str]) -> Result<RecordBatch> {
    let location = string_column(batch, "location")?;
    let mask: BooleanArray = location
        .iter()
        .map(|v| Some(v.is_some_and(|s| countries.contains(&s))))
        .collect();
    filter_record_batch(batch, &mask).context("Failed to filter rows by location")
}
