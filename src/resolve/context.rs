//! Immutable key/value context threaded through scope walks.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Typed key of a [`ResolveContext`] entry.
///
/// Keys are identified by name and value type, so a key can be declared
/// as a `const` wherever it is needed.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> Key<T> {
    fn id(&self) -> KeyId {
        KeyId {
            name: self.name,
            type_id: TypeId::of::<T>(),
        }
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyId {
    name: &'static str,
    type_id: TypeId,
}

type Value = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct Entry {
    key: KeyId,
    value: Value,
}

/// Small sizes are stored inline; only three or more keys allocate a map.
#[derive(Clone, Default)]
enum Repr {
    #[default]
    Empty,
    One(Entry),
    Two(Entry, Entry),
    Map(Arc<FxHashMap<KeyId, Value>>),
}

/// Persistent association from typed keys to values.
///
/// Every operation returns a new context; existing contexts never change,
/// so a context can be shared freely between threads and scope levels.
/// [`merge`](Self::merge) is left-biased.
#[derive(Clone, Default)]
pub struct ResolveContext(Repr);

impl ResolveContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A context holding just `key`.
    pub fn of<T: Any + Send + Sync>(key: Key<T>, value: T) -> Self {
        Self(Repr::One(Entry {
            key: key.id(),
            value: Arc::new(value),
        }))
    }

    /// A copy of this context with `key` set to `value`, replacing any
    /// previous value of `key`.
    pub fn put<T: Any + Send + Sync>(&self, key: Key<T>, value: T) -> Self {
        Self::of(key, value).merge(self)
    }

    pub fn get<T: Any + Send + Sync>(&self, key: Key<T>) -> Option<&T> {
        self.lookup(key.id())?.downcast_ref::<T>()
    }

    pub fn contains<T: 'static>(&self, key: Key<T>) -> bool {
        self.lookup(key.id()).is_some()
    }

    pub fn len(&self) -> usize {
        match &self.0 {
            Repr::Empty => 0,
            Repr::One(_) => 1,
            Repr::Two(..) => 2,
            Repr::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0, Repr::Empty)
    }

    /// Names of the keys present, in no particular order.
    pub fn key_names(&self) -> Vec<&'static str> {
        self.entries().iter().map(|e| e.key.name).collect()
    }

    /// Union of both contexts. Keys present in `self` keep their value
    /// from `self`.
    pub fn merge(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut entries = self.entries();
        for entry in other.entries() {
            if self.lookup(entry.key).is_none() {
                entries.push(entry);
            }
        }
        Self::from_entries(entries)
    }

    fn lookup(&self, key: KeyId) -> Option<&Value> {
        match &self.0 {
            Repr::Empty => None,
            Repr::One(a) => (a.key == key).then_some(&a.value),
            Repr::Two(a, b) => {
                if a.key == key {
                    Some(&a.value)
                } else if b.key == key {
                    Some(&b.value)
                } else {
                    None
                }
            }
            Repr::Map(map) => map.get(&key),
        }
    }

    fn entries(&self) -> Vec<Entry> {
        match &self.0 {
            Repr::Empty => Vec::new(),
            Repr::One(a) => vec![a.clone()],
            Repr::Two(a, b) => vec![a.clone(), b.clone()],
            Repr::Map(map) => map
                .iter()
                .map(|(key, value)| Entry {
                    key: *key,
                    value: Arc::clone(value),
                })
                .collect(),
        }
    }

    fn from_entries(mut entries: Vec<Entry>) -> Self {
        let repr = match entries.len() {
            0 => Repr::Empty,
            1 => Repr::One(entries.remove(0)),
            2 => {
                let b = entries.remove(1);
                let a = entries.remove(0);
                Repr::Two(a, b)
            }
            _ => Repr::Map(Arc::new(
                entries.into_iter().map(|e| (e.key, e.value)).collect(),
            )),
        };
        Self(repr)
    }
}

impl PartialEq for ResolveContext {
    /// Same keys bound to the very same values.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.entries().iter().all(|entry| {
                other
                    .lookup(entry.key)
                    .is_some_and(|value| Arc::ptr_eq(value, &entry.value))
            })
    }
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.key_names();
        names.sort_unstable();
        f.debug_tuple("ResolveContext").field(&names).finish()
    }
}
