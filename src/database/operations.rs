/// Database operations for storing light classification results
use crate::database::connection::execute_with_retry;
use crate::models::ClassificationRecord;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS light_classification (
    id BIGSERIAL PRIMARY KEY,
    device TEXT NOT NULL,
    device_id TEXT NOT NULL,
    sensor_id SMALLINT NOT NULL,
    received_time TIMESTAMPTZ NOT NULL,
    sequence_no INTEGER NOT NULL,
    rssi SMALLINT NOT NULL,
    light_type TEXT NOT NULL,
    color_temp INTEGER NOT NULL,
    lux INTEGER NOT NULL,
    red INTEGER NOT NULL,
    green INTEGER NOT NULL,
    blue INTEGER NOT NULL,
    clear INTEGER NOT NULL,
    ratio_compare DOUBLE PRECISION NOT NULL
)";

/// Create the light_classification table if it does not exist yet
pub async fn ensure_schema(database_url: &str) -> Result<(), String> {
    execute_with_retry(database_url, |client| async move {
        client.execute(CREATE_TABLE, &[]).await
    })
    .await
}

/// Store one classification result in the light_classification table
///
/// # Arguments
/// * `record` - Classified reading to store
/// * `database_url` - PostgreSQL connection string
///
/// # Returns
/// Result indicating success or failure
pub async fn store_classification(
    record: &ClassificationRecord,
    database_url: &str,
) -> Result<(), String> {
    // Clone data for move into async closure
    let record = record.clone();

    execute_with_retry(database_url, move |client| {
        let record = record.clone();
        async move {
            client.execute(
                "INSERT INTO light_classification(device, device_id, sensor_id, received_time, sequence_no, rssi,
                     light_type, color_temp, lux, red, green, blue, clear, ratio_compare)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
                &[
                    &record.device,
                    &record.stream_id,
                    &(record.sensor_id as i16),
                    &record.timestamp,
                    &(record.sequence_no as i32),
                    &(record.rssi as i16),
                    &record.light_type.as_str(),
                    &(record.color_temp as i32),
                    &(record.lux as i32),
                    &(record.red as i32),
                    &(record.green as i32),
                    &(record.blue as i32),
                    &(record.clear as i32),
                    &record.ratio_compare,
                ],
            ).await
        }
    }).await
}
