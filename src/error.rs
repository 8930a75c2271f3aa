//! Error types for VoteChain

use std::fmt;

#[derive(Debug, Clone)]
pub enum VoteChainError {
    DatabaseError(String),
    DuplicateVoter,
    TokenSpaceExhausted,
}

impl fmt::Display for VoteChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VoteChainError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            VoteChainError::DuplicateVoter => write!(f, "Voter already registered"),
            VoteChainError::TokenSpaceExhausted => {
                write!(f, "Could not allocate a unique credential token")
            }
        }
    }
}

impl std::error::Error for VoteChainError {}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, VoteChainError>;
