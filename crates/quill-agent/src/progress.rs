/// Receives human-readable progress from the pipelines.
///
/// The CLI prints to the terminal; tests pass `&()` to stay silent.
pub trait Progress {
    /// A new pipeline stage has started.
    fn stage(&self, _message: &str) {}

    /// A model call is in flight.
    fn waiting(&self, _message: &str) {}

    /// The current stage finished with `message`.
    fn done(&self, _message: &str) {}

    /// Something benign was skipped or missing.
    fn warn(&self, _message: &str) {}
}

impl Progress for () {}
