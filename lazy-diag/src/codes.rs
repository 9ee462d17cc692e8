//! Registry of diagnostic codes emitted by `lazy-diag`.

use crate::diagnostic::Diagnostic;
use crate::diagnostic::Severity;
use crate::diagnostic::Span;

/// A diagnostic code.
#[derive(Clone, Copy, Debug)]
pub struct Code {
  /// Stable string identifier, e.g. `DEP0001`.
  pub id: &'static str,
}

impl Code {
  pub const fn new(id: &'static str) -> Self {
    Code { id }
  }

  pub const fn as_str(&self) -> &'static str {
    self.id
  }

  pub fn diagnostic(
    &self,
    severity: Severity,
    message: impl Into<String>,
    primary: Span,
  ) -> Diagnostic {
    Diagnostic::new(severity, self.id, message, primary)
  }
}

/// Reference to a deprecated entity.
pub const DEPRECATED: Code = Code::new("DEP0001");

/// Reference to a deprecated entity whose deprecation carries a message.
pub const DEPRECATED_WITH_MESSAGE: Code = Code::new("DEP0002");

/// Reference to an entity whose deprecation is an error.
pub const DEPRECATED_ERROR: Code = Code::new("DEP0003");

/// Use of an experimental API.
pub const EXPERIMENTAL: Code = Code::new("EXP0001");

pub const ALL: &[Code] = &[
  DEPRECATED,
  DEPRECATED_WITH_MESSAGE,
  DEPRECATED_ERROR,
  EXPERIMENTAL,
];
