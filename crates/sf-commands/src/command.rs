//! The reversible-operation contract.

/// A reversible state transition.
///
/// `execute` must record whatever it needs to reverse itself each time it
/// runs, because the same value is replayed on redo. Neither method may
/// fail: a command whose target is missing returns an equal state.
pub trait Command<S> {
    fn execute(&mut self, state: &S) -> S;

    fn undo(&mut self, state: &S) -> S;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "command"
    }
}
