//! Folder listing randomisation
//!
//! Walks the list once and swaps every position with a uniformly drawn
//! *different* position from the whole range. The draw never shrinks, so the
//! result is not a uniform permutation; selection order depends on this exact
//! bias and it must not be replaced by a textbook Fisher-Yates shuffle.

use rand::Rng;

/// Randomise `entries` in place
///
/// Lists with fewer than two entries are left untouched, since there is no
/// different position to swap with.
pub fn randomize<T, R: Rng + ?Sized>(entries: &mut [T], rng: &mut R) {
    let len = entries.len();
    if len < 2 {
        return;
    }

    for i in 0..len {
        let j = loop {
            let candidate = rng.gen_range(0..len);
            if candidate != i {
                break candidate;
            }
        };
        entries.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn preserves_all_entries() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut entries: Vec<u32> = (0..20).collect();

        randomize(&mut entries, &mut rng);

        let ids: HashSet<u32> = entries.iter().copied().collect();
        assert_eq!(ids.len(), 20);
        assert!((0..20).all(|i| ids.contains(&i)));
    }

    #[test]
    fn short_lists_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);

        let mut empty: Vec<u32> = vec![];
        randomize(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec!["only.mp3"];
        randomize(&mut single, &mut rng);
        assert_eq!(single, vec!["only.mp3"]);
    }

    #[test]
    fn two_entries_swap_back() {
        // Position 0 can only swap with 1 and then position 1 only with 0
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut entries = vec!["a.mp3", "b.flac"];
            randomize(&mut entries, &mut rng);
            assert_eq!(entries, vec!["a.mp3", "b.flac"]);
        }
    }

    #[test]
    fn same_seed_same_order() {
        let mut first: Vec<u32> = (0..10).collect();
        let mut second = first.clone();

        randomize(&mut first, &mut StdRng::seed_from_u64(9));
        randomize(&mut second, &mut StdRng::seed_from_u64(9));

        assert_eq!(first, second);
    }

    #[test]
    fn changes_order_eventually() {
        let original: Vec<u32> = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let changed = (0..10).any(|_| {
            let mut entries = original.clone();
            randomize(&mut entries, &mut rng);
            entries != original
        });
        assert!(changed);
    }
}
