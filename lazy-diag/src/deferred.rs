//! Diagnostics whose content is computed on first demand.

use crate::diagnostic::Diagnostic;
use crate::diagnostic::DiagnosticResult;
use crate::once::OnceSlot;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// The computation behind a deferred diagnostic.
///
/// It may force attribute completion on other entities, but must otherwise be
/// free of side effects: racing resolvers can all run it and all but one
/// result is thrown away. `None` means the answer cannot be decided on this
/// thread yet; nothing is memoized and a later resolution computes again.
pub trait ComputeDiagnostic: Send + Sync {
  fn compute_result(&self) -> Option<DiagnosticResult>;
}

impl<F> ComputeDiagnostic for F
where
  F: Fn() -> DiagnosticResult + Send + Sync,
{
  fn compute_result(&self) -> Option<DiagnosticResult> {
    Some(self())
  }
}

/// Object-safe view of a diagnostic that may not be known yet.
pub trait DeferredDiagnostic: Send + Sync {
  /// The memoized result, or `None` if it cannot be decided on this thread
  /// yet.
  fn try_resolve(&self) -> Option<Arc<DiagnosticResult>>;

  /// Like [`DeferredDiagnostic::try_resolve`], treating an undecided result as
  /// `Void` for this call only. Once memoized, every call on one instance
  /// returns the same `Arc`.
  fn resolve(&self) -> Arc<DiagnosticResult> {
    self
      .try_resolve()
      .unwrap_or_else(DiagnosticResult::shared_void)
  }

  fn is_resolved(&self) -> bool;
}

/// Memoizes the result of a [`ComputeDiagnostic`].
///
/// The first resolver computes without holding any lock and publishes with a
/// publish-if-absent; a resolver that loses the race drops its own result and
/// returns the winner's.
pub struct LazyDiagnostic<C> {
  computation: C,
  result: OnceSlot<DiagnosticResult>,
}

impl<C: ComputeDiagnostic> LazyDiagnostic<C> {
  pub fn new(computation: C) -> Self {
    Self {
      computation,
      result: OnceSlot::new(),
    }
  }

  pub fn peek(&self) -> Option<Arc<DiagnosticResult>> {
    self.result.get().cloned()
  }

  pub fn is_resolved(&self) -> bool {
    self.result.is_published()
  }

  pub fn try_resolve(&self) -> Option<Arc<DiagnosticResult>> {
    if let Some(result) = self.result.get() {
      return Some(Arc::clone(result));
    }
    let Some(computed) = self.computation.compute_result() else {
      trace!("diagnostic undecided on this thread, not memoizing");
      return None;
    };
    let computed = match computed {
      DiagnosticResult::Void => DiagnosticResult::shared_void(),
      report => Arc::new(report),
    };
    let (published, won) = self.result.publish_arc(computed);
    if !won {
      trace!("diagnostic resolved concurrently, discarding local result");
    }
    Some(Arc::clone(published))
  }

  /// Resolves the diagnostic. If it cannot be decided yet, e.g. when called
  /// from inside the attribute binding of an entity it depends on, this call
  /// sees `Void` and nothing is memoized.
  pub fn resolve(&self) -> Arc<DiagnosticResult> {
    self
      .try_resolve()
      .unwrap_or_else(DiagnosticResult::shared_void)
  }
}

impl<C: ComputeDiagnostic> DeferredDiagnostic for LazyDiagnostic<C> {
  fn try_resolve(&self) -> Option<Arc<DiagnosticResult>> {
    LazyDiagnostic::try_resolve(self)
  }

  fn is_resolved(&self) -> bool {
    LazyDiagnostic::is_resolved(self)
  }
}

impl<C: fmt::Debug> fmt::Debug for LazyDiagnostic<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LazyDiagnostic")
      .field("computation", &self.computation)
      .field("result", &self.result.get())
      .finish()
  }
}

/// A diagnostic that was known when it was recorded.
#[derive(Debug)]
pub struct Resolved(Arc<DiagnosticResult>);

impl Resolved {
  pub fn new(diagnostic: Diagnostic) -> Self {
    Self(Arc::new(DiagnosticResult::Report(diagnostic)))
  }
}

impl DeferredDiagnostic for Resolved {
  fn try_resolve(&self) -> Option<Arc<DiagnosticResult>> {
    Some(Arc::clone(&self.0))
  }

  fn is_resolved(&self) -> bool {
    true
  }
}
