//! A small fixed-size bitset over argument indices.
//!
//! The argument set is bounded (typically < 200 by the collaborator
//! inputs), so adjacency and candidate sets are represented as packed
//! `u64` words rather than a pointer-based graph, per the solver's
//! cache-friendly, allocation-light design note.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitset {
    words: Vec<u64>,
}

impl Bitset {
    #[must_use]
    pub fn empty(capacity: usize) -> Self {
        Self {
            words: vec![0u64; capacity.div_ceil(64).max(1)],
        }
    }

    pub fn insert(&mut self, index: usize) {
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    #[must_use]
    pub fn intersects(&self, other: &Bitset) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| (a & b) != 0)
    }

    #[must_use]
    pub fn is_subset_of(&self, other: &Bitset) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| (a & !b) == 0)
    }

    pub fn union_with(&mut self, other: &Bitset) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    #[must_use]
    pub fn with_inserted(&self, index: usize) -> Self {
        let mut clone = self.clone();
        clone.insert(index);
        clone
    }

    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        let words = &self.words;
        (0..words.len() * 64).filter(move |i| (words[i / 64] >> (i % 64)) & 1 == 1)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut b = Bitset::empty(5);
        b.insert(0);
        b.insert(4);
        assert!(b.contains(0));
        assert!(b.contains(4));
        assert!(!b.contains(1));
    }

    #[test]
    fn subset_and_intersects() {
        let mut a = Bitset::empty(10);
        a.insert(1);
        a.insert(2);
        let mut b = Bitset::empty(10);
        b.insert(1);
        b.insert(2);
        b.insert(3);
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        assert!(a.intersects(&b));
    }

    #[test]
    fn spans_multiple_words() {
        let mut b = Bitset::empty(200);
        b.insert(130);
        assert!(b.contains(130));
        assert_eq!(b.count(), 1);
    }
}
