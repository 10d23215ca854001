//! Typed failure kinds shared by every solver in the crate.
//!
//! Public operations return [`anyhow::Result`]; the error carried inside is an
//! [`AlgebraError`] whenever the failure is one of the documented kinds, so
//! callers can recover it with `err.downcast_ref::<AlgebraError>()`.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlgebraError {
    /// Operand shapes are incompatible with the requested operation.
    #[error("dimension mismatch: {0}")]
    Dimension(String),

    /// An iterative kernel ran out of its iteration budget.
    #[error("{solver} did not converge within {iterations} iterations")]
    Convergence {
        solver: &'static str,
        iterations: usize,
    },

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The general eigen solver found complex conjugate pairs, reported as `(re, im)`.
    #[error("matrix has complex eigenvalues: {eigenvalues:?}")]
    ComplexEigenvalues { eigenvalues: Vec<(f64, f64)> },
}

impl AlgebraError {
    pub fn dimension(msg: impl Into<String>) -> Self {
        AlgebraError::Dimension(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        AlgebraError::UnsupportedConfiguration(msg.into())
    }

    pub fn convergence(solver: &'static str, iterations: usize) -> Self {
        AlgebraError::Convergence { solver, iterations }
    }

    /// Returns the typed kind of an [`anyhow::Error`], if it carries one.
    pub fn kind_of(err: &anyhow::Error) -> Option<&AlgebraError> {
        err.downcast_ref::<AlgebraError>()
    }
}
