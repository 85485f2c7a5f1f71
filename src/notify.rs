/// Surface for the transient success/error messages shown to the user.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "taleweaver::notice", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "taleweaver::notice", "{message}");
    }
}
