use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("description is too long ({len} characters, max {max})")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("clock error: {0}")]
    Clock(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
