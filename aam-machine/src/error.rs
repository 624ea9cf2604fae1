// INFRASTRUCTURAL ERROR
// ================================================================================================

/// Driver- and configuration-level failures (spec §10.3's `AamError`, the infrastructural sibling
/// of [`aam_core::SemanticError`]): things wrong before or around exploration, never produced by a
/// `Semantics` step. These abort the run outright rather than becoming a dead end in the state
/// graph — the distinction spec §7 draws between "a program can go wrong" (modeled) and "the
/// analysis itself cannot proceed" (reported and exited).
#[derive(Debug, thiserror::Error)]
pub enum AamError {
    #[error("failed to parse program: {0}")]
    Parse(String),

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
