use ahash::HashMap;
use ahash::HashMapExt;
use lazy_diag::OnceSlot;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug_span;
use tracing::trace;

/// Keeps the value of every key that occurs exactly once and carries a value.
///
/// A key seen a second time is tombstoned, and tombstones are dropped along
/// with keys whose value is absent, so neither appears in the result.
pub fn build_unique<K, V>(entries: impl IntoIterator<Item = (K, Option<V>)>) -> HashMap<K, V>
where
  K: Eq + Hash,
{
  let mut grouped: HashMap<K, Option<V>> = HashMap::new();
  for (key, value) in entries {
    match grouped.entry(key) {
      Entry::Occupied(mut slot) => {
        slot.insert(None);
      }
      Entry::Vacant(slot) => {
        slot.insert(value);
      }
    }
  }
  grouped
    .into_iter()
    .filter_map(|(key, value)| value.map(|value| (key, value)))
    .collect()
}

/// A secondary view over a primary collection, built on first use.
///
/// Racing builders may each build a full candidate index; one is published
/// and the rest are dropped. Entries added to the primary collection after
/// the snapshot was taken are not reflected until [`DerivedIndex::reset`].
pub struct DerivedIndex<K, V> {
  built: OnceSlot<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> DerivedIndex<K, V> {
  pub const fn new() -> Self {
    Self {
      built: OnceSlot::new(),
    }
  }

  pub fn get(&self) -> Option<Arc<HashMap<K, V>>> {
    self.built.get().cloned()
  }

  pub fn is_built(&self) -> bool {
    self.built.is_published()
  }

  /// Returns the published index, building it from `snapshot` on a miss.
  pub fn get_or_build<I>(&self, snapshot: impl FnOnce() -> I) -> Arc<HashMap<K, V>>
  where
    I: IntoIterator<Item = (K, Option<V>)>,
  {
    if let Some(index) = self.built.get() {
      return Arc::clone(index);
    }
    let span = debug_span!("emit_test_data.build_index", entries = tracing::field::Empty);
    let _guard = span.enter();
    let index = build_unique(snapshot());
    span.record("entries", index.len());
    let (published, won) = self.built.publish(index);
    if !won {
      trace!("index built concurrently, discarding local build");
    }
    Arc::clone(published)
  }

  /// Drops the published index so the next lookup rebuilds it.
  pub fn reset(&mut self) -> Option<Arc<HashMap<K, V>>> {
    self.built.take()
  }
}

impl<K: Eq + Hash, V> Default for DerivedIndex<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> fmt::Debug for DerivedIndex<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DerivedIndex")
      .field("built", &self.built.get().map(|index| index.len()))
      .field("discarded_builds", &self.built.discarded())
      .finish()
  }
}
