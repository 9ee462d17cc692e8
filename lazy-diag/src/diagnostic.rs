use crate::context::ContextFlags;
use crate::entity::Entity;
use crate::entity::EntityId;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A stable identifier for a file in a program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

/// A byte range in a file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize)]
pub struct TextRange {
  pub start: u32,
  pub end: u32,
}

impl TextRange {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }
}

/// Where a reference occurs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Span {
  pub file: FileId,
  pub range: TextRange,
}

impl Span {
  pub const fn new(file: FileId, range: TextRange) -> Self {
    Self { file, range }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Error,
  Warning,
  Note,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Note => "note",
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The entity a diagnostic is about.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Subject {
  pub id: EntityId,
  pub name: String,
}

impl Subject {
  pub fn of(entity: &dyn Entity) -> Self {
    Self {
      id: entity.id(),
      name: entity.name().to_string(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub code: &'static str,
  pub severity: Severity,
  pub message: String,
  pub primary: Span,
  pub subject: Option<Subject>,
  pub notes: Vec<String>,
  /// Context flags in effect at the reference site.
  pub flags: ContextFlags,
}

impl Diagnostic {
  pub fn new(
    severity: Severity,
    code: &'static str,
    message: impl Into<String>,
    primary: Span,
  ) -> Self {
    Self {
      code,
      severity,
      message: message.into(),
      primary,
      subject: None,
      notes: Vec::new(),
      flags: ContextFlags::empty(),
    }
  }

  pub fn with_subject(mut self, subject: Subject) -> Self {
    self.subject = Some(subject);
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.notes.push(note.into());
    self
  }

  pub fn with_flags(mut self, flags: ContextFlags) -> Self {
    self.flags = flags;
    self
  }
}

/// The materialized outcome of a deferred diagnostic: something to report or
/// the explicit "nothing to report" sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticResult {
  Report(Diagnostic),
  Void,
}

static VOID: Lazy<Arc<DiagnosticResult>> = Lazy::new(|| Arc::new(DiagnosticResult::Void));

impl DiagnosticResult {
  /// The process-wide `Void` instance. Every memoized "nothing to report"
  /// result is this `Arc`.
  pub fn shared_void() -> Arc<DiagnosticResult> {
    Arc::clone(&VOID)
  }

  pub fn diagnostic(&self) -> Option<&Diagnostic> {
    match self {
      DiagnosticResult::Report(diagnostic) => Some(diagnostic),
      DiagnosticResult::Void => None,
    }
  }

  pub fn is_void(&self) -> bool {
    matches!(self, DiagnosticResult::Void)
  }
}

impl From<Diagnostic> for DiagnosticResult {
  fn from(value: Diagnostic) -> Self {
    DiagnosticResult::Report(value)
  }
}

/// Sort diagnostics by file, range, code, then message.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
  diagnostics.sort_by(|a, b| {
    a.primary
      .file
      .cmp(&b.primary.file)
      .then(a.primary.range.start.cmp(&b.primary.range.start))
      .then(a.primary.range.end.cmp(&b.primary.range.end))
      .then(a.code.cmp(b.code))
      .then(a.message.cmp(&b.message))
  });
}
