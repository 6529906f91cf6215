/// What a store reports for a write.
///
/// Some stores only acknowledge a write, others report how many records it
/// touched; callers only ever see a success flag or a count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Acknowledged(bool),
    Affected(u64),
}

impl WriteOutcome {
    /// Result of a single-record write.
    pub fn succeeded(self) -> bool {
        match self {
            Self::Acknowledged(acknowledged) => acknowledged,
            Self::Affected(count) => count >= 1,
        }
    }

    /// Result of a multi-record write.
    pub fn affected(self) -> u64 {
        match self {
            Self::Acknowledged(acknowledged) => u64::from(acknowledged),
            Self::Affected(count) => count,
        }
    }
}
