use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RescueError {
    /// Operand outside the field or group constraints (order of zero, no
    /// admissible exponent, unfactorable group order, ...).
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Division by zero in prime field")]
    DivisionByZero,

    #[error("Singular matrix: echelon form reached rank {rank}, required {required}")]
    SingularMatrix { rank: usize, required: usize },

    #[error("Security level of {security_level} bits not reached within {max_depth} rounds")]
    SecurityBoundUnreachable { security_level: u32, max_depth: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid dimension: expected {expected}, got {got}")]
    InvalidDimension { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, RescueError>;
