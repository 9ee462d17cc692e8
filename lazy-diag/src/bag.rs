use crate::deferred::DeferredDiagnostic;
use crate::deferred::Resolved;
use crate::diagnostic::sort_diagnostics;
use crate::diagnostic::Diagnostic;
use crate::diagnostic::DiagnosticResult;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Diagnostics recorded during analysis, some of them not yet resolved.
#[derive(Default)]
pub struct DiagnosticBag {
  entries: Mutex<Vec<Arc<dyn DeferredDiagnostic>>>,
}

impl DiagnosticBag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push_resolved(&self, diagnostic: Diagnostic) {
    self.entries.lock().push(Arc::new(Resolved::new(diagnostic)));
  }

  pub fn push_deferred(&self, diagnostic: Arc<dyn DeferredDiagnostic>) {
    self.entries.lock().push(diagnostic);
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  /// Entries not resolved yet.
  pub fn pending(&self) -> usize {
    self
      .entries
      .lock()
      .iter()
      .filter(|d| !d.is_resolved())
      .count()
  }

  /// Resolves every entry and returns what should be reported, sorted.
  /// Entries that cannot be decided on this thread yet are left pending.
  pub fn resolve_all(&self) -> Vec<Diagnostic> {
    // Resolution may block in force_complete; never hold the lock across it.
    let entries = self.entries.lock().clone();
    let mut diagnostics: Vec<Diagnostic> = entries
      .iter()
      .filter_map(|entry| entry.try_resolve())
      .filter_map(|result| match &*result {
        DiagnosticResult::Report(diagnostic) => Some(diagnostic.clone()),
        DiagnosticResult::Void => None,
      })
      .collect();
    sort_diagnostics(&mut diagnostics);
    diagnostics
  }
}

impl fmt::Debug for DiagnosticBag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DiagnosticBag")
      .field("len", &self.len())
      .finish()
  }
}
