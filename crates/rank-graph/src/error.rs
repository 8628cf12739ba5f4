//! Graph-subsystem error type.

use thiserror::Error;

use rank_core::RankId;

/// Errors produced by `rank-graph`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("no route from {from} to {to}")]
    Unreachable { from: RankId, to: RankId },
}

pub type GraphResult<T> = Result<T, GraphError>;
