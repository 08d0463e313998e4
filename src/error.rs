//! Error types for the AHP engine
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for pairwise comparison matrix operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    /// A comparison matrix must hold at least one item
    #[error("comparison matrix must hold at least one item")]
    Empty,

    /// Row or column index outside the matrix
    #[error("index {index} out of range for matrix of {size} items")]
    IndexOutOfRange { index: usize, size: usize },

    /// An item cannot be compared against itself
    #[error("item {index} cannot be compared against itself")]
    SelfComparison { index: usize },

    /// Judgment values must be strictly positive
    #[error("judgment value must be positive, got {value}")]
    NonPositiveValue { value: f64 },
}

/// Error type for hierarchy structure and sequencing violations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HierarchyError {
    /// A hierarchy needs at least one level
    #[error("hierarchy needs at least one level")]
    NoLevels,

    /// Level index outside the hierarchy
    #[error("level {level} out of range for hierarchy with {levels} levels")]
    LevelOutOfRange { level: usize, levels: usize },

    /// Factor index outside a level's factor list
    #[error("factor {index} out of range for level {level} with {count} factors")]
    FactorOutOfRange {
        level: usize,
        index: usize,
        count: usize,
    },

    /// Parent index outside the previous level's factor list
    #[error("parent {parent} out of range for level {level} with {count} comparison matrices")]
    ParentOutOfRange {
        level: usize,
        parent: usize,
        count: usize,
    },

    /// Matrices cannot be built while a level has no factors
    #[error("level {level} has no factors")]
    EmptyLevel { level: usize },

    /// Comparison matrices are built exactly once
    #[error("comparison matrices already built")]
    AlreadyBuilt,

    /// Operation requires comparison matrices to exist
    #[error("comparison matrices not built yet")]
    NotBuilt,

    /// Aggregation was requested before every pair was judged
    #[error(
        "matrix at level {level}, parent {parent} is missing {missing} of {required} judgments"
    )]
    IncompleteJudgments {
        level: usize,
        parent: usize,
        missing: usize,
        required: usize,
    },

    /// Aggregation was requested while a matrix fails the consistency check
    #[error("matrix at level {level}, parent {parent} is inconsistent (CI = {ci:.3})")]
    Inconsistent { level: usize, parent: usize, ci: f64 },
}

/// Error type for session persistence
#[derive(Debug, Error)]
pub enum SessionError {
    /// IO error while saving or loading a session
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Session was written by a newer version of this library
    #[error("session version {0} is newer than supported")]
    VersionTooNew(u32),
}

/// Top-level error type for AHP operations
#[derive(Debug, Error)]
pub enum AhpError {
    /// Comparison matrix error
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// Hierarchy structure or sequencing error
    #[error("hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    /// Session persistence error
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Result type alias for AHP operations
pub type AhpResult<T> = Result<T, AhpError>;
