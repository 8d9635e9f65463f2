// src/load/mod.rs
use anyhow::{Context, Result};
use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
    sync::Arc,
};
use tracing::debug;

/// Rows per decoded Arrow batch before everything is concatenated.
const BATCH_SIZE: usize = 8192;

/// Columns that hold names and codes. An empty one is still text.
pub const TEXT_COLUMNS: [&str; 3] = ["iso_code", "continent", "location"];

/// Arrow infers `Null` for a column with no values; keep text columns as `Utf8`.
fn text_columns_as_utf8(schema: &Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| match f.data_type() {
            DataType::Null if TEXT_COLUMNS.contains(&f.name().as_str()) => {
                Field::new(f.name(), DataType::Utf8, true)
            }
            _ => f.as_ref().clone(),
        })
        .collect();
    Schema::new(fields)
}

/// Load a headed CSV file into a single in-memory `RecordBatch`.
///
/// The schema is inferred from every record, so a column that is numeric
/// only far down the file still comes out numeric. Empty fields are null.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    load_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load CSV file: {:?}", path.as_ref()))
}

/// Same as [`load_csv`], for any seekable reader.
pub fn load_from_reader<R: Read + Seek>(mut reader: R) -> Result<RecordBatch> {
    // 1) infer the schema over the whole input
    let format = Format::default().with_header(true);
    let (schema, records) = format
        .infer_schema(&mut reader, None)
        .context("Failed to infer CSV schema")?;
    debug!(records, columns = schema.fields().len(), "inferred schema");
    let schema = Arc::new(text_columns_as_utf8(&schema));

    // 2) rewind and decode with the inferred schema
    reader.rewind().context("Failed to rewind CSV input")?;
    let csv = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .build(reader)
        .context("Failed to build CSV reader")?;

    let mut batches = Vec::new();
    for (idx, batch) in csv.enumerate() {
        batches.push(batch.with_context(|| format!("CSV parse error in batch {}", idx))?);
    }

    // 3) one table for the rest of the pipeline
    let batch = concat_batches(&schema, &batches).context("Failed to concatenate batches")?;
    debug!(rows = batch.num_rows(), "loaded");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{DataType, Int64Type};
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "iso_code,location,date,total_cases,total_deaths
KEN,Kenya,2021-05-01,160000,2800
KEN,Kenya,2021-05-02,,2810
FRA,France,2021-05-01,5600000,105000
";

    #[test]
    fn loads_headers_rows_and_nulls() -> Result<()> {
        let batch = load_from_reader(Cursor::new(SAMPLE))?;

        assert_eq!(batch.num_rows(), 3);
        let names: Vec<&str> = batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(
            names,
            vec!["iso_code", "location", "date", "total_cases", "total_deaths"]
        );

        let cases = batch.column_by_name("total_cases").unwrap();
        assert_eq!(cases.data_type(), &DataType::Int64);
        assert_eq!(cases.null_count(), 1);
        assert_eq!(cases.as_primitive::<Int64Type>().value(2), 5_600_000);

        let location = batch.column_by_name("location").unwrap().as_string::<i32>();
        assert_eq!(location.value(2), "France");
        Ok(())
    }

    #[test]
    fn header_only_keeps_text_columns_as_text() -> Result<()> {
        let batch = load_from_reader(Cursor::new("iso_code,location,date,total_cases\n"))?;
        assert_eq!(batch.num_rows(), 0);

        let schema = batch.schema();
        assert_eq!(schema.field_with_name("iso_code")?.data_type(), &DataType::Utf8);
        assert_eq!(schema.field_with_name("location")?.data_type(), &DataType::Utf8);
        assert_eq!(schema.field_with_name("total_cases")?.data_type(), &DataType::Null);
        Ok(())
    }

    #[test]
    fn empty_iso_code_is_text() -> Result<()> {
        let batch = load_from_reader(Cursor::new(
            "iso_code,location,date,total_cases\n,Kenya,2021-05-01,10\n",
        ))?;
        let iso = batch.column_by_name("iso_code").unwrap();
        assert_eq!(iso.data_type(), &DataType::Utf8);
        assert_eq!(iso.null_count(), 1);
        Ok(())
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(SAMPLE.as_bytes())?;

        let batch = load_csv(tmp.path())?;
        assert_eq!(batch.num_rows(), 3);
        Ok(())
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_csv("definitely-not-here.csv").unwrap_err();
        assert!(format!("{:#}", err).contains("definitely-not-here.csv"));
    }
}
