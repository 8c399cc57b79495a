//! Processor lifecycle as tracked by the render host.

/// Lifecycle of a hosted processor.
///
/// ```text
/// Active ──process() returns false──▶ Discarded
/// Active ──host tears it down───────▶ Discarded
/// ```
///
/// There is no way back from `Discarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorState {
    /// The host keeps invoking the processor once per quantum.
    #[default]
    Active,

    /// The host no longer invokes the processor.
    Discarded,
}

impl ProcessorState {
    /// ```
    /// use frame_forwarder::host::ProcessorState;
    ///
    /// assert!(ProcessorState::Active.is_active());
    /// assert!(!ProcessorState::Discarded.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        matches!(self, ProcessorState::Active)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessorState::Active => "Active",
            ProcessorState::Discarded => "Discarded",
        }
    }
}
