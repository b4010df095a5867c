use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Timestamp out of range: {0} ms")]
    TimestampOutOfRange(i64),
}
