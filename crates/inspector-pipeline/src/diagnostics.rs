//! Diagnostics sinks.
//!
//! The pipeline never propagates errors past its boundary. Configuration
//! problems and member-access failures are turned into [`Diagnostic`]s and
//! handed to a [`DiagnosticSink`].

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::error::{Diagnostic, DiagnosticCode};

/// Receives structured warnings from the pipeline.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Logs each diagnostic with `tracing::warn!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::warn!(
            code = diagnostic.code().code(),
            field = diagnostic.field(),
            attribute = diagnostic.attribute(),
            "{diagnostic}"
        );
    }
}

/// Records diagnostics in memory.
///
/// Clones share the same buffer, so a host can keep one handle and give
/// the other to the inspector.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    collected: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything reported so far.
    pub fn collected(&self) -> Vec<Diagnostic> {
        self.collected.borrow().clone()
    }

    /// Returns the codes reported so far, in order.
    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.collected.borrow().iter().map(Diagnostic::code).collect()
    }

    pub fn len(&self) -> usize {
        self.collected.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.collected.borrow_mut().clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.collected.borrow_mut().push(diagnostic.clone());
    }
}

/// Sink wrapper that suppresses repeated reports.
///
/// With `report_once` set, a (field, attribute, code) triple reaches the
/// sink at most once until [`reset`](Self::reset) is called.
pub struct Diagnostics {
    sink: Box<dyn DiagnosticSink>,
    report_once: bool,
    seen: RefCell<FxHashSet<(String, &'static str, DiagnosticCode)>>,
    suppressed: RefCell<usize>,
}

impl Diagnostics {
    pub fn new(sink: Box<dyn DiagnosticSink>, report_once: bool) -> Self {
        Self {
            sink,
            report_once,
            seen: RefCell::new(FxHashSet::default()),
            suppressed: RefCell::new(0),
        }
    }

    /// Forwards `diagnostic` unless it was already reported.
    ///
    /// Returns true if the diagnostic reached the sink.
    pub fn report(&self, diagnostic: Diagnostic) -> bool {
        if self.report_once {
            let key = (
                diagnostic.field().to_string(),
                diagnostic.attribute(),
                diagnostic.code(),
            );
            if !self.seen.borrow_mut().insert(key) {
                *self.suppressed.borrow_mut() += 1;
                return false;
            }
        }
        self.sink.report(&diagnostic);
        true
    }

    /// Number of reports dropped as duplicates.
    pub fn suppressed(&self) -> usize {
        *self.suppressed.borrow()
    }

    /// Forgets which diagnostics were already reported.
    pub fn reset(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("report_once", &self.report_once)
            .field("seen", &self.seen.borrow().len())
            .field("suppressed", &self.suppressed())
            .finish()
    }
}
