use std::fmt;

use crate::SyntaxKind;

const SIZE: usize = SyntaxKind::COUNT.div_ceil(u64::BITS as usize);

/// Compact bitset over `SyntaxKind`, usable in `const` tables.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SyntaxSet {
    bits: [u64; SIZE],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SIZE] };
    /// Every token and layout kind.
    pub const ANY: Self = Self { bits: [u64::MAX; SIZE] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn from_kind(kind: SyntaxKind) -> Self {
        let kind = kind as u16;

        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;

        debug_assert!(
            slot_index < Self::EMPTY.bits.len(),
            "Index out of bounds. Increase the size of the bitset array."
        );

        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        let mut bits = Self::EMPTY.bits;
        bits[slot_index] = mask;

        Self { bits }
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;

        while i < self.bits.len() {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < kinds.len() {
            set = set.union(&Self::from_kind(kinds[i]));
            i += 1;
        }

        set
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;
        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        self.bits[slot_index] & mask != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        SyntaxKind::ALL.iter().copied().filter(|&kind| self.contains(kind))
    }
}

impl fmt::Debug for SyntaxSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            return f.write_str("{any}");
        }
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership() {
        const SET: SyntaxSet = SyntaxSet::new([SyntaxKind::PLUS, SyntaxKind::UNKNOWN_EXPR]);

        assert!(SET.contains(SyntaxKind::PLUS));
        assert!(SET.contains(SyntaxKind::UNKNOWN_EXPR));
        assert!(!SET.contains(SyntaxKind::MINUS));
        assert_eq!(SET.iter().collect::<Vec<_>>(), [SyntaxKind::PLUS, SyntaxKind::UNKNOWN_EXPR]);
    }

    #[test]
    fn any_contains_every_kind() {
        assert!(SyntaxKind::ALL.iter().all(|&kind| SyntaxSet::ANY.contains(kind)));
    }
}
