//! inspection error
use thiserror::Error as ThisError;
/// A `Result` alias where the `Err` case is `flowlens::Error`.
pub type Result<T> = std::result::Result<T, Error>;
/// The Errors that may occur when loading a match configuration.
///
/// Flow observation itself is infallible: classification and reporting
/// degrade locally instead of surfacing errors, so the only fallible
/// surface of this crate is configuration supply.
#[derive(ThisError, Debug)]
pub enum Error {
  /// configuration file could not be read
  #[error(transparent)]
  IO(#[from] std::io::Error),
  /// configuration document is not valid JSON
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  /// configuration was parsed but selects nothing useful
  #[error("invalid configuration: {0}")]
  Config(String),
}

pub(crate) fn config_error(msg: &str) -> Error {
  Error::Config(msg.to_string())
}
