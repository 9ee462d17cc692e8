mod common;

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;

use common::{context, deprecated, CountingEntity};
use lazy_diag::{
  AttrData, DeferredDiagnostic, DeprecationDiagnostic, DiagnosticResult, EntityId, EntityKind,
  EntityRef, LazyDiagnostic, ResolveOptions, SourceEntity,
};
use parking_lot::Mutex;
use rayon::prelude::*;

const RACERS: usize = 8;

#[test]
fn racing_resolvers_observe_one_result() {
  let computations = AtomicUsize::new(0);
  let barrier = Barrier::new(RACERS);
  let lazy = LazyDiagnostic::new(|| {
    computations.fetch_add(1, Ordering::SeqCst);
    barrier.wait();
    DiagnosticResult::Void
  });

  let results: Vec<Arc<DiagnosticResult>> = thread::scope(|s| {
    let handles: Vec<_> = (0..RACERS).map(|_| s.spawn(|| lazy.resolve())).collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  // The barrier holds every racer inside the computation, so all of them
  // computed and all but one result was discarded.
  assert_eq!(computations.load(Ordering::SeqCst), RACERS);
  let published = lazy.peek().expect("published");
  assert!(results.iter().all(|r| Arc::ptr_eq(r, &published)));
}

#[test]
fn racing_resolvers_share_a_materialized_diagnostic() {
  let computations = AtomicUsize::new(0);
  let foo = SourceEntity::completed(
    EntityId(0),
    "Foo",
    EntityKind::Type,
    None,
    deprecated("use Bar instead"),
  )
  .into_ref();
  let lazy = Arc::new(DeprecationDiagnostic::deprecation(
    foo,
    context(),
    Arc::new(ResolveOptions::default()),
  ));
  let counted = {
    let lazy = Arc::clone(&lazy);
    let computations = &computations;
    LazyDiagnostic::new(move || {
      computations.fetch_add(1, Ordering::SeqCst);
      (*lazy.resolve()).clone()
    })
  };

  let results: Vec<Arc<DiagnosticResult>> = (0..64)
    .into_par_iter()
    .map(|_| counted.resolve())
    .collect();

  let first = &results[0];
  assert!(first.diagnostic().is_some());
  assert!(results.iter().all(|r| Arc::ptr_eq(r, first)));
  let ran = computations.load(Ordering::SeqCst);
  assert!((1..=64).contains(&ran));
  assert!(Arc::ptr_eq(&lazy.resolve(), &lazy.resolve()));
}

#[test]
fn forcing_blocks_racers_until_binding_finishes() {
  let (started_tx, started_rx) = mpsc::channel();
  let (release_tx, release_rx) = mpsc::channel::<()>();
  let release_rx = Mutex::new(release_rx);
  let started_tx = Mutex::new(started_tx);
  let foo = Arc::new(SourceEntity::new(
    EntityId(0),
    "Foo",
    EntityKind::Type,
    None,
    move || {
      started_tx.lock().send(()).unwrap();
      release_rx.lock().recv().unwrap();
      deprecated("use Bar instead")
    },
  ));
  let candidate: EntityRef = foo.clone();
  let lazy = DeprecationDiagnostic::deprecation(
    candidate,
    context(),
    Arc::new(ResolveOptions::default()),
  );

  let results: Vec<Arc<DiagnosticResult>> = thread::scope(|s| {
    let handles: Vec<_> = (0..RACERS).map(|_| s.spawn(|| lazy.resolve())).collect();
    started_rx.recv().unwrap();
    release_tx.send(()).unwrap();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  assert_eq!(foo.attrs().bind_count(), 1);
  let first = &results[0];
  assert_eq!(
    first.diagnostic().map(|d| d.message.as_str()),
    Some("`Foo` is deprecated: use Bar instead")
  );
  assert!(results.iter().all(|r| Arc::ptr_eq(r, first)));
}

#[test]
fn trait_objects_resolve_through_the_same_cell() {
  let foo = CountingEntity::new(0, "Foo", None, AttrData::default());
  let candidate: EntityRef = foo.clone();
  let lazy: Arc<dyn DeferredDiagnostic> = Arc::new(DeprecationDiagnostic::deprecation(
    candidate,
    context(),
    Arc::new(ResolveOptions::default()),
  ));
  assert!(!lazy.is_resolved());
  let results: Vec<_> = (0..16).into_par_iter().map(|_| lazy.resolve()).collect();
  assert!(lazy.is_resolved());
  assert!(results.iter().all(|r| r.is_void()));
  assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
  assert_eq!(foo.bind_count(), 1);
}
