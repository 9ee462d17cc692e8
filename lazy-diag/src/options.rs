use crate::policy::SuppressionPolicy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Options captured by every deferred diagnostic when it is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveOptions {
  pub policy: SuppressionPolicy,
  /// Report deprecation warnings in compiler-generated code as notes.
  pub generated_code_lowers_warnings: bool,
  /// A deprecated entity enclosing the reference site silences the
  /// diagnostic.
  pub suppress_in_deprecated_containers: bool,
}

impl Default for ResolveOptions {
  fn default() -> Self {
    Self {
      policy: SuppressionPolicy::default(),
      generated_code_lowers_warnings: true,
      suppress_in_deprecated_containers: true,
    }
  }
}

#[derive(Debug, Error)]
pub enum OptionsError {
  #[error("malformed resolve options: {0}")]
  Malformed(#[from] serde_json::Error),
  #[error("suppression rule {index} has no flags and would match every site")]
  EmptyRule { index: usize },
}

impl ResolveOptions {
  pub fn from_json(text: &str) -> Result<Self, OptionsError> {
    let options: ResolveOptions = serde_json::from_str(text)?;
    options.validate()?;
    Ok(options)
  }

  pub fn validate(&self) -> Result<(), OptionsError> {
    match self.policy.rules.iter().position(|rule| rule.when.is_empty()) {
      Some(index) => Err(OptionsError::EmptyRule { index }),
      None => Ok(()),
    }
  }
}
