//! Deciding whether a reference to a possibly deprecated entity is reported.

use crate::context::CallingContext;
use crate::entity::Entity;
use crate::options::ResolveOptions;
use crate::policy::Verdict;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
  /// Not deprecated, or silenced by the context. Nothing is ever reported.
  Inapplicable,
  Reportable,
  /// The candidate's attributes are incomplete; the context is settled.
  PendingCompletion,
  /// The candidate's attributes are incomplete, or the candidate is
  /// deprecated, and whether the context silences it depends on a container
  /// whose attributes are incomplete too.
  PendingCompletionAmbiguousSuppression,
}

/// A classification a caller may act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
  Inapplicable,
  Reportable,
}

impl Classification {
  pub fn terminal(self) -> Option<Terminal> {
    match self {
      Classification::Inapplicable => Some(Terminal::Inapplicable),
      Classification::Reportable => Some(Terminal::Reportable),
      Classification::PendingCompletion
      | Classification::PendingCompletionAmbiguousSuppression => None,
    }
  }

  pub fn is_pending(self) -> bool {
    self.terminal().is_none()
  }
}

/// A classification rule: deprecation and experimental-API checks each
/// provide one.
pub type Rule = fn(&dyn Entity, &CallingContext, &ResolveOptions) -> Classification;

/// Classifies a reference to `candidate` from `context` without forcing
/// anything.
pub fn classify(
  candidate: &dyn Entity,
  context: &CallingContext,
  options: &ResolveOptions,
) -> Classification {
  let containers_matter = options.suppress_in_deprecated_containers;
  if !candidate.is_completion_finished() {
    let context_settled =
      !containers_matter || context.containers().all(|c| c.is_completion_finished());
    return if context_settled {
      Classification::PendingCompletion
    } else {
      Classification::PendingCompletionAmbiguousSuppression
    };
  }
  if !candidate.is_deprecated() {
    return Classification::Inapplicable;
  }
  if options.policy.verdict(context.flags()) == Verdict::Suppress {
    return Classification::Inapplicable;
  }
  if containers_matter {
    for container in context.containers() {
      if !container.is_completion_finished() {
        return Classification::PendingCompletionAmbiguousSuppression;
      }
      if container.is_deprecated() {
        return Classification::Inapplicable;
      }
    }
  }
  Classification::Reportable
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settled {
  pub terminal: Terminal,
  /// Forcing rounds performed before the classification became terminal.
  pub rounds: usize,
}

fn outstanding(candidate: &dyn Entity, context: &CallingContext) -> usize {
  usize::from(!candidate.is_completion_finished())
    + context
      .containers()
      .filter(|c| !c.is_completion_finished())
      .count()
}

/// Forces completion until `rule` yields a terminal classification.
///
/// Each round forces the candidate, plus every container when suppression is
/// ambiguous, then reclassifies. A round must complete at least one entity,
/// so the number of rounds is bounded by the length of the containing chain
/// plus one.
///
/// Returns `None` when a round stalls because the calling thread is itself
/// completing one of the entities involved, i.e. when called from inside an
/// attribute binder. Nothing can settle until that binding returns.
///
/// # Panics
///
/// Panics if a round completes nothing and no entity involved is being
/// completed by the calling thread.
pub fn settle(
  candidate: &dyn Entity,
  context: &CallingContext,
  options: &ResolveOptions,
  rule: Rule,
) -> Option<Settled> {
  let mut rounds = 0;
  let mut remaining = outstanding(candidate, context);
  loop {
    let classification = rule(candidate, context, options);
    if let Some(terminal) = classification.terminal() {
      return Some(Settled { terminal, rounds });
    }
    rounds += 1;
    trace!(
      entity = candidate.name(),
      round = rounds,
      ?classification,
      "forcing attribute completion"
    );
    candidate.force_complete();
    if classification == Classification::PendingCompletionAmbiguousSuppression {
      for container in context.containers() {
        container.force_complete();
      }
    }
    let now = outstanding(candidate, context);
    if now >= remaining {
      if candidate.is_completing_on_current_thread()
        || context
          .containers()
          .any(|c| c.is_completing_on_current_thread())
      {
        trace!(
          entity = candidate.name(),
          ?classification,
          "completion in progress on this thread, leaving unsettled"
        );
        return None;
      }
      panic!(
        "internal error: forcing attribute completion for `{}` made no progress ({:?})",
        candidate.name(),
        classification
      );
    }
    remaining = now;
  }
}
