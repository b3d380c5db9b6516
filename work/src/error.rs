use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WorkError {
    #[error("work generation cancelled")]
    Cancelled,
}
