//! Id-keyed storage for host-owned simulation objects.
//!
//! Iteration order is id order, which is also insertion order since ids
//! are handed out monotonically. Reverse lookups that scan an arena are
//! therefore deterministic.

use std::{
    collections::BTreeMap,
    marker::PhantomData,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Arena<Id: IdLike + Ord + Copy, T> {
    inner: BTreeMap<Id, T>,
    #[serde(default)]
    next_id: usize,
    #[serde(skip)]
    _phantom: PhantomData<Id>,
}

impl<Id: IdLike + Ord + Copy, T> Arena<Id, T> {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
            next_id: 0,
            _phantom: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn push(&mut self, x: T) -> Id {
        let id = Id::from_raw(self.next_id);
        self.next_id += 1;
        self.inner.insert(id, x);
        id
    }

    pub fn insert(&mut self, id: Id, x: T) {
        self.inner.insert(id, x);
        if id.into_raw() >= self.next_id {
            self.next_id = id.into_raw() + 1;
        }
    }

    pub fn remove(&mut self, id: Id) -> Option<T> {
        self.inner.remove(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.inner.contains_key(&id)
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.inner.get(&id)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.inner.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.inner.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.inner.iter().map(|(i, v)| (*i, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id, &mut T)> {
        self.inner.iter_mut().map(|(i, v)| (*i, v))
    }
}

impl<Id: IdLike + Ord + Copy, T> Default for Arena<Id, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: IdLike + Ord + Copy, T> Index<Id> for Arena<Id, T> {
    type Output = T;

    fn index(&self, index: Id) -> &Self::Output {
        self.inner
            .get(&index)
            .unwrap_or_else(|| panic!("no entry for id {}", index.into_raw()))
    }
}

impl<Id: IdLike + Ord + Copy, T> IndexMut<Id> for Arena<Id, T> {
    fn index_mut(&mut self, index: Id) -> &mut Self::Output {
        self.inner
            .get_mut(&index)
            .unwrap_or_else(|| panic!("no entry for id {}", index.into_raw()))
    }
}

pub trait IdLike {
    fn from_raw(index: usize) -> Self;
    fn into_raw(self) -> usize;
}

/// Declares a transparent `u64` id type usable as an [`Arena`] key.
#[macro_export]
macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $crate::arena::IdLike for $name {
            fn from_raw(index: usize) -> Self {
                Self(index as u64)
            }

            fn into_raw(self) -> usize {
                self.0 as usize
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::arena_id!(TestId);

    #[test]
    fn iteration_follows_insertion_order() {
        let mut arena = Arena::<TestId, &str>::new();
        let a = arena.push("a");
        let b = arena.push("b");
        let c = arena.push("c");
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, b, c]);

        arena.remove(b);
        let d = arena.push("d");
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, c, d]);
        assert_eq!(arena[d], "d");
    }

    #[test]
    fn insert_bumps_next_id() {
        let mut arena = Arena::<TestId, u8>::new();
        arena.insert(TestId(5), 1);
        let next = arena.push(2);
        assert_eq!(next, TestId(6));
        assert_eq!(arena.len(), 2);
    }
}
