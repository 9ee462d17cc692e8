//! Which context flag combinations silence a deprecation diagnostic.

use crate::context::ContextFlags;
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Suppress,
  Report,
}

/// Applies when every flag in `when` is set at the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionRule {
  pub when: ContextFlags,
  pub verdict: Verdict,
}

/// Ordered rule table. The first applicable rule decides; a site no rule
/// recognizes is reported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionPolicy {
  pub rules: Vec<SuppressionRule>,
}

impl SuppressionPolicy {
  pub fn empty() -> Self {
    Self { rules: Vec::new() }
  }

  pub fn rule(mut self, when: ContextFlags, verdict: Verdict) -> Self {
    self.rules.push(SuppressionRule { when, verdict });
    self
  }

  pub fn verdict(&self, flags: ContextFlags) -> Verdict {
    self
      .rules
      .iter()
      .find(|rule| !rule.when.is_empty() && flags.contains(rule.when))
      .map_or(Verdict::Report, |rule| rule.verdict)
  }
}

impl Default for SuppressionPolicy {
  fn default() -> Self {
    Self::empty()
      .rule(ContextFlags::SUPPRESS_DEPRECATION, Verdict::Suppress)
      .rule(ContextFlags::IN_DEPRECATED_MEMBER, Verdict::Suppress)
  }
}
