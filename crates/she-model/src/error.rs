use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("metric '{metric}' expects {expected} label values, got {actual}")]
    LabelArity {
        metric: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid options: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
