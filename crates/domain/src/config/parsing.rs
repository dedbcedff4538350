use serde::{Deserialize, Serialize};

/// Which packets and messages turn into output records.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParsingConfig {
    /// Parse DNS carried over TCP (length-prefixed messages)
    #[serde(default)]
    pub include_tcp: bool,

    /// Emit a question-only record for every query
    #[serde(default)]
    pub questions: bool,

    /// Emit a question-only record for queries carrying an ECS option
    #[serde(default)]
    pub questions_ecs: bool,
}
