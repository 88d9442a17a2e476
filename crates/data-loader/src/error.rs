use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataLoaderError {
    #[error("no data available for symbol {0}")]
    SymbolNotFound(String),

    #[error("empty bar set for symbol {symbol} between {start} and {end}")]
    EmptyRange {
        symbol: String,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    #[error("invalid bar in feed for {0}: {1}")]
    InvalidBar(String, #[source] core_types::CoreError),
}
