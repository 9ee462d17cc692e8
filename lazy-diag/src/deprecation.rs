//! References to deprecated entities.
//!
//! The binder calls [`report_deprecation`] at each reference site. When the
//! answer is already known the diagnostic is recorded immediately; otherwise
//! a [`DeprecationDiagnostic`] is recorded and resolved when diagnostics are
//! collected, after forcing whatever attribute data it still needs.

use crate::bag::DiagnosticBag;
use crate::classify::classify;
use crate::classify::settle;
use crate::classify::Classification;
use crate::classify::Terminal;
use crate::codes;
use crate::context::CallingContext;
use crate::context::ContextFlags;
use crate::deferred::ComputeDiagnostic;
use crate::deferred::LazyDiagnostic;
use crate::diagnostic::Diagnostic;
use crate::diagnostic::DiagnosticResult;
use crate::diagnostic::Severity;
use crate::diagnostic::Subject;
use crate::entity::Entity;
use crate::entity::EntityRef;
use crate::options::ResolveOptions;
use std::sync::Arc;
use tracing::debug_span;

/// Everything needed to decide a deprecation diagnostic later.
#[derive(Debug)]
pub struct DeprecationCheck {
  candidate: EntityRef,
  context: CallingContext,
  options: Arc<ResolveOptions>,
}

impl ComputeDiagnostic for DeprecationCheck {
  fn compute_result(&self) -> Option<DiagnosticResult> {
    let span = debug_span!(
      "lazy_diag.resolve_deprecation",
      entity = self.candidate.name(),
      id = self.candidate.id().0,
      rounds = tracing::field::Empty,
    );
    let _guard = span.enter();
    let settled = settle(&*self.candidate, &self.context, &self.options, classify)?;
    span.record("rounds", settled.rounds);
    Some(match settled.terminal {
      Terminal::Reportable => materialize(&*self.candidate, &self.context, &self.options).into(),
      Terminal::Inapplicable => DiagnosticResult::Void,
    })
  }
}

pub type DeprecationDiagnostic = LazyDiagnostic<DeprecationCheck>;

impl LazyDiagnostic<DeprecationCheck> {
  pub fn deprecation(
    candidate: EntityRef,
    context: CallingContext,
    options: Arc<ResolveOptions>,
  ) -> Self {
    LazyDiagnostic::new(DeprecationCheck {
      candidate,
      context,
      options,
    })
  }
}

/// Builds the diagnostic for a reference classified as reportable.
pub fn materialize(
  candidate: &dyn Entity,
  context: &CallingContext,
  options: &ResolveOptions,
) -> Diagnostic {
  let metadata = candidate.deprecation().unwrap_or_default();
  let adjective = metadata.kind.adjective();
  let code = match (metadata.is_error, metadata.message.is_some()) {
    (true, _) => codes::DEPRECATED_ERROR,
    (false, true) => codes::DEPRECATED_WITH_MESSAGE,
    (false, false) => codes::DEPRECATED,
  };
  let message = match &metadata.message {
    Some(message) => format!("`{}` is {adjective}: {message}", candidate.name()),
    None => format!("`{}` is {adjective}", candidate.name()),
  };
  let severity = if metadata.is_error {
    Severity::Error
  } else if options.generated_code_lowers_warnings
    && context.flags().contains(ContextFlags::IN_GENERATED_CODE)
  {
    Severity::Note
  } else {
    Severity::Warning
  };

  let mut diagnostic = code
    .diagnostic(severity, message, context.site())
    .with_subject(Subject::of(candidate))
    .with_flags(context.flags());
  if let Some(replacement) = &metadata.replacement {
    diagnostic = diagnostic.with_note(format!("use `{replacement}` instead"));
  }
  diagnostic
}

/// Records the deprecation diagnostic for a reference, deferring it when the
/// classification is still pending.
pub fn report_deprecation(
  candidate: &EntityRef,
  context: &CallingContext,
  options: &Arc<ResolveOptions>,
  bag: &DiagnosticBag,
) {
  match classify(&**candidate, context, options) {
    Classification::Inapplicable => {}
    Classification::Reportable => {
      bag.push_resolved(materialize(&**candidate, context, options));
    }
    Classification::PendingCompletion
    | Classification::PendingCompletionAmbiguousSuppression => {
      bag.push_deferred(Arc::new(DeprecationDiagnostic::deprecation(
        Arc::clone(candidate),
        context.clone(),
        Arc::clone(options),
      )));
    }
  }
}
