use crate::diagnostic::Span;
use crate::entity::self_and_containers;
use crate::entity::EntityRef;
use bitflags::bitflags;
use serde::Deserialize;
use serde::Serialize;

bitflags! {
  /// Facts about a reference site that the binder knows when it records the
  /// reference.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
  #[serde(transparent)]
  pub struct ContextFlags: u16 {
    /// The enclosing scope disables deprecation checks.
    const SUPPRESS_DEPRECATION = 1 << 0;
    /// The binder already knows the site is inside a deprecated member.
    const IN_DEPRECATED_MEMBER = 1 << 1;
    const IN_ATTRIBUTE_ARGUMENT = 1 << 2;
    /// Compiler-synthesized code. Affects severity only.
    const IN_GENERATED_CODE = 1 << 3;
    const IN_DOC_COMMENT = 1 << 4;
    /// The enclosing scope opts in to experimental APIs.
    const SUPPRESS_EXPERIMENTAL = 1 << 5;
  }
}

/// Site-specific information under which a diagnostic is evaluated.
#[derive(Clone, Debug)]
pub struct CallingContext {
  containing: Option<EntityRef>,
  flags: ContextFlags,
  site: Span,
}

impl CallingContext {
  pub fn new(site: Span) -> Self {
    Self {
      containing: None,
      flags: ContextFlags::empty(),
      site,
    }
  }

  pub fn within(mut self, containing: EntityRef) -> Self {
    self.containing = Some(containing);
    self
  }

  pub fn with_flags(mut self, flags: ContextFlags) -> Self {
    self.flags |= flags;
    self
  }

  pub fn containing(&self) -> Option<&EntityRef> {
    self.containing.as_ref()
  }

  pub fn flags(&self) -> ContextFlags {
    self.flags
  }

  pub fn site(&self) -> Span {
    self.site
  }

  /// The containing entity and each of its containers, innermost first.
  pub fn containers(&self) -> impl Iterator<Item = EntityRef> {
    self_and_containers(self.containing.clone())
  }
}
