//! The boundary between this crate and the binder that owns program entities.
//!
//! The binder decides what an entity is and how its attributes are decoded.
//! Diagnostics only need to ask whether an entity's attribute data is complete,
//! to force it to completion, and to read the deprecation metadata afterwards.
//! [`SourceEntity`] is a ready-made implementation backed by
//! [`AttrCompletion`], used by hosts that do not bring their own.

use parking_lot::Condvar;
use parking_lot::Mutex;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::iter;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::thread::ThreadId;
use tracing::trace;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Namespace,
  Type,
  Method,
  Operator,
  Field,
  Property,
  Event,
}

impl EntityKind {
  pub const fn as_str(&self) -> &'static str {
    match self {
      EntityKind::Namespace => "namespace",
      EntityKind::Type => "type",
      EntityKind::Method => "method",
      EntityKind::Operator => "operator",
      EntityKind::Field => "field",
      EntityKind::Property => "property",
      EntityKind::Event => "event",
    }
  }
}

/// Which attribute marked the entity. Only changes wording.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeprecationKind {
  #[default]
  Deprecated,
  Obsolete,
}

impl DeprecationKind {
  pub const fn adjective(&self) -> &'static str {
    match self {
      DeprecationKind::Deprecated => "deprecated",
      DeprecationKind::Obsolete => "obsolete",
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationMetadata {
  pub message: Option<String>,
  /// Suggested replacement, surfaced as a note.
  pub replacement: Option<String>,
  /// References are errors rather than warnings.
  pub is_error: bool,
  pub kind: DeprecationKind,
}

impl DeprecationMetadata {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
    self.replacement = Some(replacement.into());
    self
  }

  pub fn as_error(mut self) -> Self {
    self.is_error = true;
    self
  }

  pub fn obsolete(mut self) -> Self {
    self.kind = DeprecationKind::Obsolete;
    self
  }
}

/// Attribute data decoded by the binder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrData {
  pub deprecation: Option<DeprecationMetadata>,
  pub experimental: bool,
}

impl AttrData {
  pub fn deprecated(metadata: DeprecationMetadata) -> Self {
    Self {
      deprecation: Some(metadata),
      experimental: false,
    }
  }

  pub fn experimental() -> Self {
    Self {
      deprecation: None,
      experimental: true,
    }
  }
}

pub type EntityRef = Arc<dyn Entity>;

/// A named program construct as seen by diagnostic resolution.
///
/// Completion is monotonic: once [`Entity::is_completion_finished`] returns
/// true it never returns false again. The attribute accessors are only
/// meaningful after completion; before it they report "not deprecated".
pub trait Entity: Send + Sync + fmt::Debug {
  fn id(&self) -> EntityId;

  fn name(&self) -> &str;

  fn kind(&self) -> EntityKind;

  fn containing(&self) -> Option<EntityRef>;

  fn is_completion_finished(&self) -> bool;

  /// Blocks until attribute data is complete. Idempotent, callable from any
  /// thread. A call made by the thread that is already completing this entity
  /// returns immediately and leaves it incomplete.
  fn force_complete(&self);

  /// Whether the calling thread is in the middle of completing this entity,
  /// so that forcing it from here cannot make progress.
  fn is_completing_on_current_thread(&self) -> bool {
    false
  }

  fn deprecation(&self) -> Option<DeprecationMetadata>;

  fn is_deprecated(&self) -> bool {
    self.deprecation().is_some()
  }

  fn is_experimental(&self) -> bool {
    false
  }
}

/// `entity` followed by each of its containers, innermost first.
pub fn self_and_containers(entity: Option<EntityRef>) -> impl Iterator<Item = EntityRef> {
  iter::successors(entity, |e| e.containing())
}

enum CompletionState {
  NotStarted,
  InProgress(ThreadId),
  Complete(Arc<AttrData>),
}

type Binder = Box<dyn Fn() -> AttrData + Send + Sync>;

/// Per-entity attribute completion.
///
/// The binder closure runs at most once per successful completion, outside the
/// state lock, on the first thread to force the entity. Other threads wait on a
/// condition variable. If the binder panics the entity returns to the
/// not-started state so a later force can retry.
pub struct AttrCompletion {
  state: Mutex<CompletionState>,
  done: Condvar,
  binder: Binder,
  bind_count: AtomicUsize,
}

impl AttrCompletion {
  pub fn new(binder: impl Fn() -> AttrData + Send + Sync + 'static) -> Self {
    Self {
      state: Mutex::new(CompletionState::NotStarted),
      done: Condvar::new(),
      binder: Box::new(binder),
      bind_count: AtomicUsize::new(0),
    }
  }

  pub fn completed(data: AttrData) -> Self {
    Self {
      state: Mutex::new(CompletionState::Complete(Arc::new(data))),
      done: Condvar::new(),
      binder: Box::new(AttrData::default),
      bind_count: AtomicUsize::new(0),
    }
  }

  pub fn is_finished(&self) -> bool {
    matches!(*self.state.lock(), CompletionState::Complete(_))
  }

  pub fn data(&self) -> Option<Arc<AttrData>> {
    match &*self.state.lock() {
      CompletionState::Complete(data) => Some(Arc::clone(data)),
      _ => None,
    }
  }

  pub fn is_in_progress_here(&self) -> bool {
    matches!(
      &*self.state.lock(),
      CompletionState::InProgress(owner) if *owner == thread::current().id()
    )
  }

  /// How many times the binder has run.
  pub fn bind_count(&self) -> usize {
    self.bind_count.load(Ordering::Relaxed)
  }

  pub fn force(&self) {
    let me = thread::current().id();
    let mut state = self.state.lock();
    loop {
      let other_thread_binding = match &*state {
        CompletionState::Complete(_) => return,
        CompletionState::InProgress(owner) if *owner == me => {
          trace!("re-entrant attribute completion, leaving incomplete");
          return;
        }
        CompletionState::InProgress(_) => true,
        CompletionState::NotStarted => false,
      };
      if !other_thread_binding {
        break;
      }
      self.done.wait(&mut state);
    }
    *state = CompletionState::InProgress(me);
    drop(state);

    let mut guard = ResetOnUnwind {
      completion: self,
      armed: true,
    };
    self.bind_count.fetch_add(1, Ordering::Relaxed);
    let data = (self.binder)();
    guard.armed = false;

    *self.state.lock() = CompletionState::Complete(Arc::new(data));
    self.done.notify_all();
  }
}

struct ResetOnUnwind<'a> {
  completion: &'a AttrCompletion,
  armed: bool,
}

impl Drop for ResetOnUnwind<'_> {
  fn drop(&mut self) {
    if self.armed {
      *self.completion.state.lock() = CompletionState::NotStarted;
      self.completion.done.notify_all();
    }
  }
}

impl fmt::Debug for AttrCompletion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = match &*self.state.lock() {
      CompletionState::NotStarted => "not started".to_string(),
      CompletionState::InProgress(owner) => format!("in progress on {owner:?}"),
      CompletionState::Complete(data) => format!("complete {data:?}"),
    };
    f.debug_struct("AttrCompletion")
      .field("state", &state)
      .field("bind_count", &self.bind_count())
      .finish()
  }
}

#[derive(Debug)]
pub struct SourceEntity {
  id: EntityId,
  name: String,
  kind: EntityKind,
  containing: Option<EntityRef>,
  attrs: AttrCompletion,
}

impl SourceEntity {
  pub fn new(
    id: EntityId,
    name: impl Into<String>,
    kind: EntityKind,
    containing: Option<EntityRef>,
    binder: impl Fn() -> AttrData + Send + Sync + 'static,
  ) -> Self {
    Self {
      id,
      name: name.into(),
      kind,
      containing,
      attrs: AttrCompletion::new(binder),
    }
  }

  pub fn completed(
    id: EntityId,
    name: impl Into<String>,
    kind: EntityKind,
    containing: Option<EntityRef>,
    data: AttrData,
  ) -> Self {
    Self {
      id,
      name: name.into(),
      kind,
      containing,
      attrs: AttrCompletion::completed(data),
    }
  }

  pub fn attrs(&self) -> &AttrCompletion {
    &self.attrs
  }

  pub fn into_ref(self) -> EntityRef {
    Arc::new(self)
  }
}

impl Entity for SourceEntity {
  fn id(&self) -> EntityId {
    self.id
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> EntityKind {
    self.kind
  }

  fn containing(&self) -> Option<EntityRef> {
    self.containing.clone()
  }

  fn is_completion_finished(&self) -> bool {
    self.attrs.is_finished()
  }

  fn force_complete(&self) {
    self.attrs.force();
  }

  fn is_completing_on_current_thread(&self) -> bool {
    self.attrs.is_in_progress_here()
  }

  fn deprecation(&self) -> Option<DeprecationMetadata> {
    self.attrs.data().and_then(|data| data.deprecation.clone())
  }

  fn is_experimental(&self) -> bool {
    self.attrs.data().is_some_and(|data| data.experimental)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use once_cell::sync::OnceCell;
  use std::sync::mpsc;
  use std::sync::Weak;
  use std::time::Duration;

  #[test]
  fn force_is_idempotent() {
    let entity = SourceEntity::new(EntityId(0), "Foo", EntityKind::Type, None, || {
      AttrData::deprecated(DeprecationMetadata::new())
    });
    assert!(!entity.is_completion_finished());
    assert!(!entity.is_deprecated());
    entity.force_complete();
    entity.force_complete();
    assert!(entity.is_completion_finished());
    assert!(entity.is_deprecated());
    assert_eq!(entity.attrs().bind_count(), 1);
  }

  #[test]
  fn re_entrant_force_does_not_deadlock() {
    let this: Arc<OnceCell<Weak<SourceEntity>>> = Arc::new(OnceCell::new());
    let inner = Arc::clone(&this);
    let entity = Arc::new(SourceEntity::new(
      EntityId(1),
      "Cyclic",
      EntityKind::Method,
      None,
      move || {
        let me = inner.get().and_then(Weak::upgrade).expect("entity registered");
        assert!(me.is_completing_on_current_thread());
        me.force_complete();
        assert!(!me.is_completion_finished());
        AttrData::default()
      },
    ));
    this.set(Arc::downgrade(&entity)).unwrap();

    entity.force_complete();
    assert!(entity.is_completion_finished());
    assert!(!entity.is_completing_on_current_thread());
    assert_eq!(entity.attrs().bind_count(), 1);
  }

  #[test]
  fn concurrent_force_waits_for_the_binding_thread() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let entity = Arc::new(SourceEntity::new(
      EntityId(2),
      "Slow",
      EntityKind::Type,
      None,
      move || {
        started_tx.send(()).unwrap();
        release_rx.lock().recv().unwrap();
        AttrData::experimental()
      },
    ));

    thread::scope(|s| {
      let binder = s.spawn(|| entity.force_complete());
      started_rx.recv().unwrap();
      let waiter = s.spawn(|| {
        entity.force_complete();
        entity.is_completion_finished()
      });
      thread::sleep(Duration::from_millis(20));
      assert!(!entity.is_completion_finished());
      assert!(!entity.is_completing_on_current_thread());
      release_tx.send(()).unwrap();
      binder.join().unwrap();
      assert!(waiter.join().unwrap());
    });
    assert!(entity.is_experimental());
    assert_eq!(entity.attrs().bind_count(), 1);
  }

  #[test]
  fn containers_are_walked_innermost_first() {
    let ns = SourceEntity::completed(
      EntityId(0),
      "N",
      EntityKind::Namespace,
      None,
      AttrData::default(),
    )
    .into_ref();
    let ty = SourceEntity::completed(
      EntityId(1),
      "T",
      EntityKind::Type,
      Some(ns),
      AttrData::default(),
    )
    .into_ref();
    let names: Vec<String> = self_and_containers(Some(ty))
      .map(|e| e.name().to_string())
      .collect();
    assert_eq!(names, vec!["T", "N"]);
  }
}
