use clap::ValueEnum;

/// Whether evidence may still be changed once a transaction is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EvidencePolicy {
    /// Either party may overwrite the reference at any state, including
    /// after completion (historical correction).
    #[default]
    Amendable,
    /// The reference is frozen once both parties have confirmed.
    /// Attempts are rejected with `EvidenceLocked`.
    FrozenOnCompletion,
}

/// Runtime settings for the `SettlementEngine`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub evidence_policy: EvidencePolicy,
}

impl EngineConfig {
    pub fn with_evidence_policy(mut self, policy: EvidencePolicy) -> Self {
        self.evidence_policy = policy;
        self
    }
}
