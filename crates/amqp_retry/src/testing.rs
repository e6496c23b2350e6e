// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// Collects the formatted retry events emitted while it is installed.
///
/// Install with `tracing::subscriber::set_default(capture.subscriber())`; the guard keeps the
/// capture active for the current thread only, so parallel tests do not see each other's events.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    lines: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain-text `fmt` subscriber writing into this capture.
    #[must_use]
    pub fn subscriber(&self) -> impl tracing::Subscriber {
        use tracing_subscriber::layer::SubscriberExt;
        tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_writer(self.clone()).with_ansi(false))
    }

    /// Panics unless some captured event contains `expected`.
    pub fn assert_contains(&self, expected: &str) {
        let captured = self.captured();
        assert!(
            captured.contains(expected),
            "no retry event contains '{expected}', captured:\n{captured}"
        );
    }

    /// Panics unless some captured event carries `field` rendered as `value`.
    pub fn assert_field(&self, field: &str, value: &str) {
        self.assert_contains(&format!("{field}={value}"));
    }

    fn captured(&self) -> String {
        String::from_utf8_lossy(&self.lines.lock().unwrap()).into_owned()
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
        Sink(Arc::clone(&self.lines))
    }
}

pub(crate) struct Sink(Arc<Mutex<Vec<u8>>>);

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
