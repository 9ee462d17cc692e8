#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use lazy_diag::{
  AttrData, CallingContext, DeprecationMetadata, Entity, EntityId, EntityKind, EntityRef, FileId,
  SourceEntity, Span, TextRange,
};

pub fn site() -> Span {
  Span::new(FileId(0), TextRange::new(4, 7))
}

pub fn context() -> CallingContext {
  CallingContext::new(site())
}

pub fn deprecated(message: &str) -> AttrData {
  AttrData::deprecated(DeprecationMetadata::new().with_message(message))
}

pub fn completed(id: u32, name: &str, data: AttrData) -> EntityRef {
  SourceEntity::completed(EntityId(id), name, EntityKind::Method, None, data).into_ref()
}

pub fn completed_in(id: u32, name: &str, data: AttrData, containing: EntityRef) -> EntityRef {
  SourceEntity::completed(EntityId(id), name, EntityKind::Method, Some(containing), data)
    .into_ref()
}

/// An entity that records every call to `force_complete`.
#[derive(Debug)]
pub struct CountingEntity {
  inner: SourceEntity,
  forced: AtomicUsize,
}

impl CountingEntity {
  pub fn new(id: u32, name: &str, containing: Option<EntityRef>, data: AttrData) -> Arc<Self> {
    Arc::new(Self {
      inner: SourceEntity::new(EntityId(id), name, EntityKind::Type, containing, move || {
        data.clone()
      }),
      forced: AtomicUsize::new(0),
    })
  }

  pub fn forced(&self) -> usize {
    self.forced.load(Ordering::SeqCst)
  }

  pub fn bind_count(&self) -> usize {
    self.inner.attrs().bind_count()
  }
}

impl Entity for CountingEntity {
  fn id(&self) -> EntityId {
    self.inner.id()
  }

  fn name(&self) -> &str {
    self.inner.name()
  }

  fn kind(&self) -> EntityKind {
    self.inner.kind()
  }

  fn containing(&self) -> Option<EntityRef> {
    self.inner.containing()
  }

  fn is_completion_finished(&self) -> bool {
    self.inner.is_completion_finished()
  }

  fn force_complete(&self) {
    self.forced.fetch_add(1, Ordering::SeqCst);
    self.inner.force_complete();
  }

  fn is_completing_on_current_thread(&self) -> bool {
    self.inner.is_completing_on_current_thread()
  }

  fn deprecation(&self) -> Option<DeprecationMetadata> {
    self.inner.deprecation()
  }

  fn is_experimental(&self) -> bool {
    self.inner.is_experimental()
  }
}
