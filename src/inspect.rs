use anyhow::Result;
use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};
use std::fmt;

/// Shape and null counts of a loaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub columns: Vec<String>,
    pub rows: usize,
    /// `(column, nulls)` in column order.
    pub null_counts: Vec<(String, usize)>,
}

pub fn summarize(batch: &RecordBatch) -> DatasetSummary {
    let columns: Vec<String> = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let null_counts = columns
        .iter()
        .zip(batch.columns())
        .map(|(name, col)| (name.clone(), col.logical_null_count()))
        .collect();

    DatasetSummary {
        columns,
        rows: batch.num_rows(),
        null_counts,
    }
}

impl DatasetSummary {
    pub fn total_nulls(&self) -> usize {
        self.null_counts.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shape: ({}, {})", self.rows, self.columns.len())?;
        let width = self.columns.iter().map(String::len).max().unwrap_or(0);
        for (name, nulls) in &self.null_counts {
            writeln!(f, "{:<width$} {:>10}", name, nulls, width = width)?;
        }
        Ok(())
    }
}

/// Print column names, the first `head_rows` rows and per-column null counts.
pub fn print_overview(batch: &RecordBatch, head_rows: usize) -> Result<DatasetSummary> {
    let summary = summarize(batch);
    println!("Columns in dataset: {:?}", summary.columns);

    let head = batch.slice(0, head_rows.min(batch.num_rows()));
    println!("{}", pretty_format_batches(&[head])?);

    print!("{}", summary);
    Ok(summary)
}
