//! Single-assignment cells shared by every memoized result in the crate.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// A cell written at most once.
///
/// Racing writers may each compute a candidate value, but only the first to
/// publish wins. Later values are dropped and every reader observes the same
/// `Arc`. Losing racers still ran their computations to completion, so those
/// must not have side effects beyond idempotent ones.
pub struct OnceSlot<T> {
  cell: OnceCell<Arc<T>>,
  discarded: AtomicUsize,
}

impl<T> OnceSlot<T> {
  pub const fn new() -> Self {
    Self {
      cell: OnceCell::new(),
      discarded: AtomicUsize::new(0),
    }
  }

  pub fn get(&self) -> Option<&Arc<T>> {
    self.cell.get()
  }

  pub fn is_published(&self) -> bool {
    self.cell.get().is_some()
  }

  /// Number of values that lost a publication race and were dropped.
  pub fn discarded(&self) -> usize {
    self.discarded.load(Ordering::Relaxed)
  }

  /// Publishes `value` unless a value is already present. Returns the
  /// published value and whether it was `value`.
  pub fn publish(&self, value: T) -> (&Arc<T>, bool) {
    self.publish_arc(Arc::new(value))
  }

  pub fn publish_arc(&self, value: Arc<T>) -> (&Arc<T>, bool) {
    match self.cell.try_insert(value) {
      Ok(published) => (published, true),
      Err((published, _lost)) => {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        (published, false)
      }
    }
  }

  /// Clears the cell. Exclusive access guarantees no reader can observe the
  /// transition.
  pub fn take(&mut self) -> Option<Arc<T>> {
    self.cell.take()
  }
}

impl<T> Default for OnceSlot<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: fmt::Debug> fmt::Debug for OnceSlot<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OnceSlot")
      .field("value", &self.cell.get())
      .field("discarded", &self.discarded())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::OnceSlot;
  use std::sync::Arc;
  use std::sync::Barrier;
  use std::thread;

  #[test]
  fn first_publish_wins() {
    let slot = OnceSlot::new();
    let (first, won) = slot.publish(1);
    assert!(won);
    let first = Arc::clone(first);
    let (second, won) = slot.publish(2);
    assert!(!won);
    assert!(Arc::ptr_eq(&first, second));
    assert_eq!(**second, 1);
    assert_eq!(slot.discarded(), 1);
  }

  #[test]
  fn racing_publishers_agree_on_one_value() {
    const RACERS: usize = 8;
    let slot = OnceSlot::new();
    let barrier = Barrier::new(RACERS);
    let results: Vec<(Arc<usize>, bool)> = thread::scope(|s| {
      let handles: Vec<_> = (0..RACERS)
        .map(|i| {
          let slot = &slot;
          let barrier = &barrier;
          s.spawn(move || {
            barrier.wait();
            let (value, won) = slot.publish(i);
            (Arc::clone(value), won)
          })
        })
        .collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|(_, won)| *won).count(), 1);
    assert_eq!(slot.discarded(), RACERS - 1);
    let winner = slot.get().unwrap();
    assert!(results.iter().all(|(v, _)| Arc::ptr_eq(v, winner)));
  }

  #[test]
  fn take_allows_a_fresh_publish() {
    let mut slot = OnceSlot::new();
    slot.publish("old");
    assert_eq!(slot.take().as_deref(), Some(&"old"));
    assert!(!slot.is_published());
    let (value, won) = slot.publish("new");
    assert!(won);
    assert_eq!(**value, "new");
  }
}
