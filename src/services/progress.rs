/// Progress sink for a crawl run.
///
/// The batch runner is the only caller; it reports completions in the order
/// they happen, which is not the order of the input list.
pub trait Progress: Send {
    fn begin(&mut self, _total: usize) {}
    fn item_done(&mut self, _done: usize, _total: usize, _query: &str) {}
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Writes one log line per finished query.
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        LogProgress {
            label: label.into(),
        }
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        log::info!("{} [0/{}]", self.label, total);
    }

    fn item_done(&mut self, done: usize, total: usize, query: &str) {
        log::info!("{} [{}/{}] result={}", self.label, done, total, query);
    }

    fn finish(&mut self) {
        log::info!("{} finished", self.label);
    }
}
