//! Slot model of the index engine.

/// One slot of an open-addressing table.
///
/// Fixed-size tables store their payload directly in the slot ([`HashTableEntry::Inline`]);
/// variable-size tables store the position of the payload inside the data section
/// ([`HashTableEntry::AtOffset`]). A slot whose hash is `0` is [`HashTableEntry::Empty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashTableEntry<T> {
    /// Unused slot; terminates a probe sequence.
    Empty,
    /// Occupied slot of a fixed-size table.
    Inline {
        /// Hash of the logical key
        hash: u32,
        /// Decoded payload
        data: T,
    },
    /// Occupied slot of a variable-size table.
    AtOffset {
        /// Hash of the logical key
        hash: u32,
        /// Payload offset relative to the start of the data section
        offset: u32,
    },
}

impl<T> HashTableEntry<T> {
    /// The key hash stored in this slot, `0` for [`HashTableEntry::Empty`].
    #[must_use]
    pub fn hash(&self) -> u32 {
        match self {
            HashTableEntry::Empty => 0,
            HashTableEntry::Inline { hash, .. } | HashTableEntry::AtOffset { hash, .. } => *hash,
        }
    }

    /// Returns `true` if the slot is unused.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, HashTableEntry::Empty)
    }
}
