//! Dense, append-only storage for tree entities keyed by opaque IDs.
//!
//! IDs are never reused and entries are never removed, so an ID held by a
//! parent link or an exclusion request cannot dangle while the owning
//! [`CoverageDb`](crate::db::CoverageDb) is alive.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Implemented by the id newtypes of [`crate::ids`].
pub trait ArenaId: Copy {
    /// Wraps an allocation index.
    fn from_raw(index: u32) -> Self;

    /// Unwraps the allocation index.
    fn as_raw(self) -> u32;
}

/// An append-only vector addressed by `I`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an arena with nothing allocated.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Appends an item and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Looks up an item, returning `None` for IDs this arena never issued.
    ///
    /// Use this for IDs that arrive from outside (user requests, snapshots);
    /// indexing with `arena[id]` is reserved for IDs the engine produced.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.items.get(id.as_raw() as usize)
    }

    /// Mutable counterpart of [`Arena::try_get`].
    pub fn try_get_mut(&mut self, id: I) -> Option<&mut T> {
        self.items.get_mut(id.as_raw() as usize)
    }

    /// Returns `true` if `id` was issued by this arena.
    pub fn contains(&self, id: I) -> bool {
        (id.as_raw() as usize) < self.items.len()
    }

    /// Number of entries allocated so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` before the first allocation.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over all issued IDs in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = I> {
        (0..self.items.len() as u32).map(I::from_raw)
    }

    /// Walks `(id, entry)` pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Mutable counterpart of [`Arena::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }
}
