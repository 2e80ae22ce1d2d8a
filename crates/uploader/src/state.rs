/// Phases of one upload run.
///
/// A run moves strictly forward: Idle → Probing → Planning →
/// Negotiating → Transferring → Finalizing → Done. `Failed` is
/// reachable from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Probing,
    Planning,
    Negotiating,
    Transferring,
    Finalizing,
    Done,
    Failed,
}

impl UploadPhase {
    /// Returns `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadPhase::Done | UploadPhase::Failed)
    }

    /// The phase that follows on success, `None` from terminal phases.
    pub fn next(self) -> Option<UploadPhase> {
        match self {
            UploadPhase::Idle => Some(UploadPhase::Probing),
            UploadPhase::Probing => Some(UploadPhase::Planning),
            UploadPhase::Planning => Some(UploadPhase::Negotiating),
            UploadPhase::Negotiating => Some(UploadPhase::Transferring),
            UploadPhase::Transferring => Some(UploadPhase::Finalizing),
            UploadPhase::Finalizing => Some(UploadPhase::Done),
            UploadPhase::Done | UploadPhase::Failed => None,
        }
    }
}
