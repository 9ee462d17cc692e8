use crate::display::display_name;
use crate::display::MethodSig;
use crate::index::DerivedIndex;
use ahash::HashMap;
use dashmap::DashMap;
use lazy_diag::EntityId;
use std::sync::Arc;
use thiserror::Error;

/// The instruction listing produced for one method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodBody {
  pub instructions: Vec<String>,
}

impl MethodBody {
  pub fn new(instructions: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      instructions: instructions.into_iter().map(Into::into).collect(),
    }
  }
}

/// A primary entry. `body` is `None` while the slot is reserved but emission
/// has not produced anything yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedMethod {
  pub sig: Arc<MethodSig>,
  pub body: Option<Arc<MethodBody>>,
}

impl EmittedMethod {
  pub fn is_placeholder(&self) -> bool {
    self.body.is_none()
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LookupError {
  #[error("no emitted method matches")]
  NotFound,
  #[error("{count} emitted methods match, expected exactly one")]
  Ambiguous { count: usize },
}

/// Method bodies recorded during emission, keyed by source entity.
#[derive(Debug, Default)]
pub struct EmitTestData {
  methods: DashMap<EntityId, EmittedMethod, ahash::RandomState>,
  by_name: DerivedIndex<String, EmittedMethod>,
}

impl EmitTestData {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&self, sig: Arc<MethodSig>, body: MethodBody) {
    self.methods.insert(
      sig.entity,
      EmittedMethod {
        sig,
        body: Some(Arc::new(body)),
      },
    );
  }

  /// Claims a slot for a method whose body is still being emitted.
  pub fn reserve(&self, sig: Arc<MethodSig>) {
    self
      .methods
      .entry(sig.entity)
      .or_insert_with(|| EmittedMethod { sig, body: None });
  }

  pub fn methods(&self) -> &DashMap<EntityId, EmittedMethod, ahash::RandomState> {
    &self.methods
  }

  pub fn len(&self) -> usize {
    self.methods.len()
  }

  pub fn is_empty(&self) -> bool {
    self.methods.is_empty()
  }

  /// Emitted methods whose display name is unique, keyed by that name.
  pub fn methods_by_name(&self) -> Arc<HashMap<String, EmittedMethod>> {
    self.by_name.get_or_build(|| {
      // Snapshot first so no shard lock is held while grouping.
      self
        .methods
        .iter()
        .map(|entry| {
          let method = entry.value();
          let value = (!method.is_placeholder()).then(|| method.clone());
          (display_name(&method.sig), value)
        })
        .collect::<Vec<_>>()
    })
  }

  /// The method with this display name, if exactly one emitted method has it.
  pub fn lookup(&self, name: &str) -> Option<EmittedMethod> {
    self.methods_by_name().get(name).cloned()
  }

  pub fn body(&self, name: &str) -> Option<Arc<MethodBody>> {
    self.lookup(name).and_then(|method| method.body)
  }

  /// The single recorded method whose signature satisfies `predicate`.
  pub fn find_single(
    &self,
    predicate: impl Fn(&MethodSig) -> bool,
  ) -> Result<EmittedMethod, LookupError> {
    let mut found = None;
    let mut count = 0;
    for entry in self.methods.iter() {
      if predicate(&entry.value().sig) {
        count += 1;
        if found.is_none() {
          found = Some(entry.value().clone());
        }
      }
    }
    match (found, count) {
      (Some(method), 1) => Ok(method),
      (None, _) => Err(LookupError::NotFound),
      (Some(_), count) => Err(LookupError::Ambiguous { count }),
    }
  }

  /// Discards the name index; the next lookup rebuilds it from the current
  /// contents.
  pub fn reset_index(&mut self) {
    self.by_name.reset();
  }
}
