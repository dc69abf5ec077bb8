//! Exam configuration record and pool-order encoding.
//!
//! # Invariants
//! - Pool order is a sequence: repeats are legal and mean "draw again".
//! - Encoded form is decimal ids joined by `,` with no whitespace.
//! - Empty string encodes the empty order, which is a legal persisted state.
//! - Decoding never fails; malformed tokens are logged and skipped.

use crate::model::content::{ModuleId, PoolId};
use log::warn;

pub const POOL_ORDER_DELIMITER: &str = ",";

/// Persisted exam structure of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamConfig {
    pub id: i64,
    pub module_id: ModuleId,
    pub pool_order: PoolOrder,
}

/// Ordered pool ids that define assembly slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolOrder(Vec<PoolId>);

impl PoolOrder {
    pub fn new(ids: impl Into<Vec<PoolId>>) -> Self {
        Self(ids.into())
    }

    pub fn ids(&self) -> &[PoolId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(PoolId::to_string)
            .collect::<Vec<_>>()
            .join(POOL_ORDER_DELIMITER)
    }

    /// Decodes a stored pool-order string, skipping unparseable tokens.
    pub fn decode(raw: &str) -> Self {
        let mut ids = Vec::new();
        if raw.trim().is_empty() {
            return Self(ids);
        }

        for (position, token) in raw.split(POOL_ORDER_DELIMITER).enumerate() {
            match token.trim().parse::<PoolId>() {
                Ok(id) => ids.push(id),
                Err(_) => warn!(
                    "event=pool_order_decode module=exam_config status=skip position={position} token={token:?}"
                ),
            }
        }
        Self(ids)
    }
}

impl From<Vec<PoolId>> for PoolOrder {
    fn from(value: Vec<PoolId>) -> Self {
        Self(value)
    }
}
