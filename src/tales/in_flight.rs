use parking_lot::{Mutex, MutexGuard};

/// Marks a request as running in some piece of controller state and undoes
/// the mark when the request ends, including when its future is dropped
/// before completing.
pub(crate) struct InFlight<'a, S, F>
where
    F: FnOnce(&mut S),
{
    state: &'a Mutex<S>,
    release: Option<F>,
}

impl<'a, S, F> InFlight<'a, S, F>
where
    F: FnOnce(&mut S),
{
    pub(crate) fn new(state: &'a Mutex<S>, release: F) -> Self {
        Self {
            state,
            release: Some(release),
        }
    }

    /// Releases the mark and returns the state still locked, so the
    /// request's outcome is applied in the same critical section.
    pub(crate) fn finish(mut self) -> MutexGuard<'a, S> {
        let state = self.state;
        let mut guard = state.lock();
        if let Some(release) = self.release.take() {
            release(&mut guard);
        }
        guard
    }
}

impl<S, F> Drop for InFlight<'_, S, F>
where
    F: FnOnce(&mut S),
{
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!("request abandoned before completion");
            release(&mut self.state.lock());
        }
    }
}
