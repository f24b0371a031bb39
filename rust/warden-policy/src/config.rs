use serde::{Deserialize, Serialize};

use crate::StrategyKind;

/// Settings that apply to every proxy a [crate::Warden] hands out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Strategy used when a proxy is created without naming one
    pub strategy: StrategyKind,
    /// When set, an operation whose scope was never declared admits no
    /// records instead of every record
    pub paranoid: bool,
}

impl WardenConfig {
    /// Use `strategy` unless a proxy names its own
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Close undeclared scopes
    pub fn with_paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }
}
