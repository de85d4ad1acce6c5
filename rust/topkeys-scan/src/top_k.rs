//! Fixed-capacity selection of the highest-count entries.

use std::borrow::Cow;

/// A key with its associated count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub key: Vec<u8>,
    pub count: u64,
}

impl Entry {
    pub fn new(key: impl Into<Vec<u8>>, count: u64) -> Entry {
        Entry {
            key: key.into(),
            count,
        }
    }

    /// Returns the key as text, replacing invalid UTF-8 sequences.
    pub fn key_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }
}

/// Holds the best `capacity` entries offered so far.
///
/// Entries live in an unordered `Vec`; eviction and draining use a linear
/// scan, which suits capacities in the tens.
///
/// Ties resolve to the lowest index: eviction replaces the first entry holding
/// the minimum count, an offer equal to that minimum is discarded, and draining
/// emits the first entry holding the maximum count. When partial results from
/// several threads are merged, the merge order (and therefore the choice among
/// equal counts) depends on thread scheduling.
#[derive(Debug, Clone)]
pub struct BoundedTopK {
    capacity: usize,
    entries: Vec<Entry>,
}

impl BoundedTopK {
    pub fn new(capacity: usize) -> BoundedTopK {
        BoundedTopK {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Iterates over the held entries in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Returns the smallest held count.
    pub fn min_count(&self) -> Option<u64> {
        self.min_index().map(|i| self.entries[i].count)
    }

    /// Offers `(key, count)`, copying `key` only if the entry is retained.
    ///
    /// Returns `true` if the entry was retained.
    pub fn offer(&mut self, key: &[u8], count: u64) -> bool {
        if self.entries.len() < self.capacity {
            self.entries.push(Entry::new(key, count));
            return true;
        }
        match self.eviction_slot(count) {
            Some(slot) => {
                let entry = &mut self.entries[slot];
                entry.key.clear();
                entry.key.extend_from_slice(key);
                entry.count = count;
                true
            }
            None => false,
        }
    }

    /// Same as [`BoundedTopK::offer`] for an already owned entry.
    pub fn offer_entry(&mut self, entry: Entry) -> bool {
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
            return true;
        }
        match self.eviction_slot(entry.count) {
            Some(slot) => {
                self.entries[slot] = entry;
                true
            }
            None => false,
        }
    }

    /// Offers every entry of `other`, in `other`'s storage order.
    pub fn merge(&mut self, other: BoundedTopK) {
        for entry in other.entries {
            self.offer_entry(entry);
        }
    }

    /// Removes all entries, returning them by non-increasing count.
    pub fn drain_descending(&mut self) -> Vec<Entry> {
        let mut result = Vec::with_capacity(self.entries.len());
        while let Some(idx) = self.max_index() {
            result.push(self.entries.remove(idx));
        }
        result
    }

    /// Consumes the structure, returning its entries by non-increasing count.
    pub fn into_descending(mut self) -> Vec<Entry> {
        self.drain_descending()
    }

    /// Index of the entry an offer of `count` would replace in a full structure.
    fn eviction_slot(&self, count: u64) -> Option<usize> {
        self.min_index()
            .filter(|&idx| count > self.entries[idx].count)
    }

    fn min_index(&self) -> Option<usize> {
        let mut iter = self.entries.iter().enumerate();
        let (mut min_idx, mut min) = iter.next().map(|(i, e)| (i, e.count))?;
        for (i, entry) in iter {
            if entry.count < min {
                min_idx = i;
                min = entry.count;
            }
        }
        Some(min_idx)
    }

    fn max_index(&self) -> Option<usize> {
        let mut iter = self.entries.iter().enumerate();
        let (mut max_idx, mut max) = iter.next().map(|(i, e)| (i, e.count))?;
        for (i, entry) in iter {
            if entry.count > max {
                max_idx = i;
                max = entry.count;
            }
        }
        Some(max_idx)
    }
}

impl<'a> IntoIterator for &'a BoundedTopK {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
