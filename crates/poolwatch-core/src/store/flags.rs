// ── Per-operation loading/error flags ──

use tokio::sync::watch;

/// Loading flag plus error slot for one operation category.
///
/// Both sides are `watch` channels so consumers can render spinners and
/// error banners reactively. `begin` clears the error; a failure stays
/// visible until the next attempt or an explicit `clear_error`.
pub(crate) struct OpState {
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
}

impl OpState {
    pub(crate) fn new() -> Self {
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);
        Self { loading, error }
    }

    pub(crate) fn begin(&self) {
        self.loading.send_modify(|l| *l = true);
        self.error.send_modify(|e| *e = None);
    }

    pub(crate) fn finish_ok(&self) {
        self.loading.send_modify(|l| *l = false);
    }

    pub(crate) fn finish_err(&self, message: String) {
        self.loading.send_modify(|l| *l = false);
        self.error.send_modify(|e| *e = Some(message));
    }

    pub(crate) fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub(crate) fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub(crate) fn clear_error(&self) {
        self.error.send_modify(|e| *e = None);
    }

    pub(crate) fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub(crate) fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_clears_previous_error() {
        let op = OpState::new();
        op.begin();
        op.finish_err("boom".into());
        assert!(!op.is_loading());
        assert_eq!(op.error().as_deref(), Some("boom"));

        op.begin();
        assert!(op.is_loading());
        assert!(op.error().is_none());

        op.finish_ok();
        assert!(!op.is_loading());
    }
}
