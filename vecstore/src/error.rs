use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VecError {
    #[error("vecstore: dimension mismatch at position {position}: got {got}, want {want}")]
    DimensionMismatch {
        position: usize,
        got: usize,
        want: usize,
    },

    #[error("vecstore: degenerate (zero-norm) vector at position {position}")]
    DegenerateVector { position: usize },

    #[error("vecstore: k must be positive")]
    InvalidK,
}
