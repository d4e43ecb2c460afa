//! Deterministic hash containers for name-keyed tables.
//!
//! The definition cache is keyed by composite names; a fixed `foldhash`
//! seed keeps its iteration order and probe sequence identical across runs.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

pub use foldhash;
pub use hashbrown;

const SEED: FixedState = FixedState::with_seed(0x6374_7970_655f_7265);

/// The hasher built by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// A [`BuildHasher`] whose output depends on the input alone.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use ctype_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("CachedNode");
/// let b = FixedHashState.hash_one("CachedNode");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline]
    fn build_hasher(&self) -> FixedHasher {
        SEED.build_hasher()
    }
}

/// A [`hashbrown::HashMap`] hashed with [`FixedHashState`].
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_hash_the_same_every_time() {
        let mut map: HashMap<&str, u32> = HashMap::default();
        map.insert("Node", 1);
        map.insert("Leaf", 2);
        assert_eq!(map.get("Node"), Some(&1));
        assert_eq!(FixedHashState.hash_one("Leaf"), FixedHashState.hash_one("Leaf"));
        assert_ne!(FixedHashState.hash_one("Leaf"), FixedHashState.hash_one("Node"));
    }
}
