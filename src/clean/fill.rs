use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, Scalar},
    compute::{cast, is_not_null, kernels::zip::zip},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

/// One-element array holding the zero of `dtype`.
///
/// Text columns get `"0"` and dates get day 0 (1970-01-01); everything else is
/// whatever `0_i64` casts to.
fn zero_of(dtype: &DataType) -> Result<ArrayRef> {
    match dtype {
        DataType::Date32 => Ok(Arc::new(Date32Array::from(vec![0]))),
        other => cast(&Int64Array::from(vec![0_i64]), other)
            .with_context(|| format!("no zero value for {:?}", other)),
    }
}

/// Replace the nulls of a single column with its zero.
pub fn fill_column(arr: &ArrayRef) -> Result<ArrayRef> {
    // NullArray reports no physical nulls, so check the type first
    if arr.data_type() == &DataType::Null {
        return Ok(Arc::new(Float64Array::from(vec![0.0; arr.len()])));
    }
    if arr.null_count() == 0 {
        return Ok(arr.clone());
    }
    let mask = is_not_null(arr)?;
    let zero = Scalar::new(zero_of(arr.data_type())?);
    zip(&mask, arr, &zero).map_err(Into::into)
}

/// Zero-fill every null cell in every column.
pub fn fill_nulls(batch: &RecordBatch) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut cols = Vec::with_capacity(batch.num_columns());

    for (field, arr) in batch.schema_ref().fields().iter().zip(batch.columns()) {
        let filled =
            fill_column(arr).with_context(|| format!("Failed to zero-fill `{}`", field.name()))?;
        if arr.null_count() > 0 {
            debug!(column = %field.name(), nulls = arr.null_count(), "zero-filled");
        }
        fields.push(Field::new(field.name(), filled.data_type().clone(), field.is_nullable()));
        cols.push(filled);
    }

    if cols.is_empty() {
        return Ok(batch.clone());
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).map_err(Into::into)
}
