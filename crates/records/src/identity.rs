use serde::{Deserialize, Serialize};

/// Caller identity threaded through every mutating operation.
///
/// There is deliberately no default: a mutation without a known actor should
/// fail to compile, not silently run as a placeholder system user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub user_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}
