//! Component signatures as growable bitsets.
//!
//! Every component type gets a dense [`ComponentId`](super::component::ComponentId).
//! A [`Signature`] sets one bit per id, so "does this entity satisfy the
//! system's requirements" is a word-wise `AND` instead of a scan over stores.

use std::fmt;

use super::component::ComponentId;

/// A set of component ids, stored as `u64` words.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    words: Vec<u64>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signature from a list of ids.
    pub fn from_ids(ids: impl IntoIterator<Item = ComponentId>) -> Self {
        let mut sig = Self::new();
        for id in ids {
            sig.insert(id);
        }
        sig
    }

    /// Set the bit for `id`. Returns `false` if it was already set.
    pub fn insert(&mut self, id: ComponentId) -> bool {
        let (word, bit) = split(id);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_set = self.words[word] & bit != 0;
        self.words[word] |= bit;
        !was_set
    }

    /// Clear the bit for `id`.
    pub fn remove(&mut self, id: ComponentId) {
        let (word, bit) = split(id);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !bit;
        }
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        let (word, bit) = split(id);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    /// `true` if every id in `required` is also in `self`.
    pub fn contains_all(&self, required: &Signature) -> bool {
        required.words.iter().enumerate().all(|(i, &need)| {
            let have = self.words.get(i).copied().unwrap_or(0);
            have & need == need
        })
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of ids in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Iterate the ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64u32)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| ComponentId::new(i as u32 * 64 + bit))
        })
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|id| id.index())).finish()
    }
}

fn split(id: ComponentId) -> (usize, u64) {
    let index = id.index();
    ((index / 64) as usize, 1u64 << (index % 64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> ComponentId {
        ComponentId::new(i)
    }

    #[test]
    fn insert_contains_remove() {
        let mut sig = Signature::new();
        assert!(sig.insert(id(3)));
        assert!(!sig.insert(id(3)));
        assert!(sig.contains(id(3)));
        assert!(!sig.contains(id(4)));
        sig.remove(id(3));
        assert!(!sig.contains(id(3)));
        assert!(sig.is_empty());
    }

    #[test]
    fn grows_past_one_word() {
        let mut sig = Signature::new();
        sig.insert(id(130));
        assert!(sig.contains(id(130)));
        assert_eq!(sig.len(), 1);
        assert_eq!(sig.iter().collect::<Vec<_>>(), vec![id(130)]);
    }

    #[test]
    fn containment() {
        let have = Signature::from_ids([id(0), id(2), id(70)]);
        assert!(have.contains_all(&Signature::from_ids([id(0), id(70)])));
        assert!(!have.contains_all(&Signature::from_ids([id(1)])));
        assert!(!have.contains_all(&Signature::from_ids([id(200)])));
        // The empty signature is satisfied by anything.
        assert!(have.contains_all(&Signature::new()));
    }
}
