use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array, UInt8Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::model::DeliveryStatus;
use crate::telemetry::DeliveryRecord;

/// Write delivery history rows to a parquet file.
///
/// Timestamps are epoch milliseconds; `completed_at` is null for unfinished rows.
pub fn write_delivery_history_parquet<P: AsRef<Path>>(
    path: P,
    records: &[DeliveryRecord],
) -> Result<(), Box<dyn Error>> {
    let mut delivery_ids = Vec::with_capacity(records.len());
    let mut driver_ids = Vec::with_capacity(records.len());
    let mut driver_names = Vec::with_capacity(records.len());
    let mut package_ids = Vec::with_capacity(records.len());
    let mut dest_names = Vec::with_capacity(records.len());
    let mut dest_lat = Vec::with_capacity(records.len());
    let mut dest_lng = Vec::with_capacity(records.len());
    let mut assigned_at = Vec::with_capacity(records.len());
    let mut completed_at = Vec::with_capacity(records.len());
    let mut status = Vec::with_capacity(records.len());

    for record in records {
        delivery_ids.push(record.id.0);
        driver_ids.push(record.driver_id.0);
        driver_names.push(record.driver_name.clone());
        package_ids.push(record.package_id.clone());
        dest_names.push(record.dest_name.clone());
        dest_lat.push(record.dest_lat);
        dest_lng.push(record.dest_lng);
        assigned_at.push(record.assigned_at.timestamp_millis());
        completed_at.push(record.completed_at.map(|t| t.timestamp_millis()));
        status.push(delivery_status_code(record.status));
    }

    let schema = Schema::new(vec![
        Field::new("delivery_id", DataType::UInt64, false),
        Field::new("driver_id", DataType::UInt64, false),
        Field::new("driver_name", DataType::Utf8, false),
        Field::new("package_id", DataType::Utf8, false),
        Field::new("dest_name", DataType::Utf8, false),
        Field::new("dest_lat", DataType::Float64, false),
        Field::new("dest_lng", DataType::Float64, false),
        Field::new("assigned_at_ms", DataType::Int64, false),
        Field::new("completed_at_ms", DataType::Int64, true),
        Field::new("status", DataType::UInt8, false),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(delivery_ids)),
        Arc::new(UInt64Array::from(driver_ids)),
        Arc::new(StringArray::from(driver_names)),
        Arc::new(StringArray::from(package_ids)),
        Arc::new(StringArray::from(dest_names)),
        Arc::new(Float64Array::from(dest_lat)),
        Arc::new(Float64Array::from(dest_lng)),
        Arc::new(Int64Array::from(assigned_at)),
        Arc::new(Int64Array::from(completed_at)),
        Arc::new(UInt8Array::from(status)),
    ];

    write_record_batch(path, schema, arrays)
}

fn write_record_batch<P: AsRef<Path>>(
    path: P,
    schema: Schema,
    arrays: Vec<ArrayRef>,
) -> Result<(), Box<dyn Error>> {
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

pub fn delivery_status_code(status: DeliveryStatus) -> u8 {
    match status {
        DeliveryStatus::EnRoute => 0,
        DeliveryStatus::AtDestination => 1,
        DeliveryStatus::Returning => 2,
        DeliveryStatus::Completed => 3,
        DeliveryStatus::Cancelled => 4,
    }
}
