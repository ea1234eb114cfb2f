use thiserror::Error;
use vitrine_core::InterpolationError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("section motion table: {0}")]
    Motion(#[from] InterpolationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
