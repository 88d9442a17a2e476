use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("cannot grade a report with zero trades")]
    NoTrades,
}
