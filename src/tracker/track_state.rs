/// Lifecycle state of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No target selected; updates are no-ops
    #[default]
    Idle,
    /// A target is selected and followed frame over frame
    Tracking,
}
