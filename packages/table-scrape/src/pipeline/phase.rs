//! Invocation state machine.

/// Where an invocation is.
///
/// The baseline path is `Start → Fetched → Extracted → Drained → Loaded →
/// Reported`. With the load-then-prune strategy `Loaded` precedes
/// `Drained`. Any failure jumps straight to `Reported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationPhase {
    Start,
    Fetched,
    Extracted,
    Drained,
    Loaded,
    Reported,
}

impl InvocationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Fetched => "fetched",
            Self::Extracted => "extracted",
            Self::Drained => "drained",
            Self::Loaded => "loaded",
            Self::Reported => "reported",
        }
    }
}

impl std::fmt::Display for InvocationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
