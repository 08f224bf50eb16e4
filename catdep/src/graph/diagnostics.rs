// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Diagnostics channel for cascade notices and RESTRICT violations
//!
//! The engine reports per-object notices ("drop cascades to ...", "... depends
//! on ...") through a [`DiagnosticSink`] rather than owning message routing
//! itself. The default sink forwards to the `log` crate; tests use
//! [`MemorySink`] to assert on the full notice stream.

use parking_lot::Mutex;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Detail normally suppressed (implicit auto-cascades).
    Debug2,
    Debug,
    Info,
    /// User-visible cascade notices and RESTRICT violation reports.
    Notice,
    Warning,
}

/// Receiver for engine diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, severity: Severity, message: &str);
}

/// Default sink: forwards diagnostics to the `log` crate.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug2 => log::trace!("{}", message),
            Severity::Debug => log::debug!("{}", message),
            Severity::Info => log::info!("{}", message),
            Severity::Notice => log::info!("NOTICE: {}", message),
            Severity::Warning => log::warn!("{}", message),
        }
    }
}

/// Recording sink for tests and callers that surface notices themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages reported so far, in order.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().clone()
    }

    /// Messages at `severity` or above, in order.
    pub fn messages_at_least(&self, severity: Severity) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(s, _)| *s >= severity)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, severity: Severity, message: &str) {
        self.messages.lock().push((severity, message.to_string()));
    }
}
