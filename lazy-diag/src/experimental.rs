//! Uses of experimental APIs. Shares the memoizing wrapper and forcing loop
//! with deprecation checks; only the rule and the message differ.

use crate::classify::settle;
use crate::classify::Classification;
use crate::classify::Terminal;
use crate::codes;
use crate::context::CallingContext;
use crate::context::ContextFlags;
use crate::deferred::ComputeDiagnostic;
use crate::deferred::LazyDiagnostic;
use crate::diagnostic::DiagnosticResult;
use crate::diagnostic::Severity;
use crate::diagnostic::Subject;
use crate::entity::Entity;
use crate::entity::EntityRef;
use crate::options::ResolveOptions;
use std::sync::Arc;
use tracing::debug_span;

/// Classifies a use of `candidate`. An experimental container opts its whole
/// body in, the same way a deprecated container silences deprecation.
pub fn classify_experimental(
  candidate: &dyn Entity,
  context: &CallingContext,
  _options: &ResolveOptions,
) -> Classification {
  if !candidate.is_completion_finished() {
    return if context.containers().all(|c| c.is_completion_finished()) {
      Classification::PendingCompletion
    } else {
      Classification::PendingCompletionAmbiguousSuppression
    };
  }
  if !candidate.is_experimental()
    || context
      .flags()
      .contains(ContextFlags::SUPPRESS_EXPERIMENTAL)
  {
    return Classification::Inapplicable;
  }
  for container in context.containers() {
    if !container.is_completion_finished() {
      return Classification::PendingCompletionAmbiguousSuppression;
    }
    if container.is_experimental() {
      return Classification::Inapplicable;
    }
  }
  Classification::Reportable
}

#[derive(Debug)]
pub struct ExperimentalCheck {
  candidate: EntityRef,
  context: CallingContext,
  options: Arc<ResolveOptions>,
}

impl ComputeDiagnostic for ExperimentalCheck {
  fn compute_result(&self) -> Option<DiagnosticResult> {
    let _span = debug_span!(
      "lazy_diag.resolve_experimental",
      entity = self.candidate.name()
    )
    .entered();
    let settled = settle(
      &*self.candidate,
      &self.context,
      &self.options,
      classify_experimental,
    )?;
    Some(match settled.terminal {
      Terminal::Inapplicable => DiagnosticResult::Void,
      Terminal::Reportable => codes::EXPERIMENTAL
        .diagnostic(
          Severity::Warning,
          format!(
            "{} `{}` is experimental and may change or be removed",
            self.candidate.kind().as_str(),
            self.candidate.name()
          ),
          self.context.site(),
        )
        .with_subject(Subject::of(&*self.candidate))
        .with_flags(self.context.flags())
        .into(),
    })
  }
}

pub type ExperimentalDiagnostic = LazyDiagnostic<ExperimentalCheck>;

impl LazyDiagnostic<ExperimentalCheck> {
  pub fn experimental(
    candidate: EntityRef,
    context: CallingContext,
    options: Arc<ResolveOptions>,
  ) -> Self {
    LazyDiagnostic::new(ExperimentalCheck {
      candidate,
      context,
      options,
    })
  }
}
