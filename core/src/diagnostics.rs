/// Ordered, human-readable diagnostic lines returned to callers.
///
/// Each line is prefixed with its level (`INFO: `, `WARN: `, `ERROR: `) and
/// mirrored to `tracing` so embedders can route it through a subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticLog {
    lines: Vec<String>,
    errors: usize,
}

pub const INFO_PREFIX: &str = "INFO: ";
pub const WARN_PREFIX: &str = "WARN: ";
pub const ERROR_PREFIX: &str = "ERROR: ";

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!(target: "report_bundle", "{}", msg);
        self.lines.push(format!("{}{}", INFO_PREFIX, msg));
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!(target: "report_bundle", "{}", msg);
        self.lines.push(format!("{}{}", WARN_PREFIX, msg));
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::error!(target: "report_bundle", "{}", msg);
        self.lines.push(format!("{}{}", ERROR_PREFIX, msg));
        self.errors += 1;
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
