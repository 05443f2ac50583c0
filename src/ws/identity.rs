use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use crate::models::Identity;

/// Names handed out to participants; each is paired with the color at the
/// same position in [`ROSTER_COLORS`].
pub const ROSTER_NAMES: [&str; 7] = ["Steve", "Dina", "Mike", "Kate", "Rita", "Sunil", "Dan"];

pub const ROSTER_COLORS: [&str; 7] = [
    "#ff6b6b", // coral red
    "#4ecdc4", // teal
    "#ffe66d", // yellow
    "#a29bfe", // lavender
    "#fd79a8", // pink
    "#74b9ff", // sky blue
    "#ffeaa7", // pale yellow
];

/// Hands out roster identities, avoiding names that are already in use
/// while any remain free.
///
/// Once every name is taken, assignment falls back to the full roster and
/// two live sessions may share a name.
pub struct IdentityPool {
    in_use: HashSet<&'static str>,
    rng: StdRng,
}

impl IdentityPool {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            in_use: HashSet::new(),
            rng,
        }
    }

    pub fn assign(&mut self) -> Identity {
        let available: Vec<usize> = (0..ROSTER_NAMES.len())
            .filter(|&i| !self.in_use.contains(ROSTER_NAMES[i]))
            .collect();

        let index = match available.choose(&mut self.rng) {
            Some(&index) => index,
            None => self.rng.gen_range(0..ROSTER_NAMES.len()),
        };

        self.in_use.insert(ROSTER_NAMES[index]);
        Identity::new(ROSTER_NAMES[index], ROSTER_COLORS[index])
    }

    /// Make `name` available again. Unknown names are ignored.
    pub fn release(&mut self, name: &str) {
        self.in_use.remove(name);
    }

    pub fn in_use(&self) -> usize {
        self.in_use.len()
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> IdentityPool {
        IdentityPool::with_rng(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn names_are_distinct_while_roster_lasts() {
        for seed in 0..20 {
            let mut pool = seeded(seed);
            let names: HashSet<String> = (0..ROSTER_NAMES.len()).map(|_| pool.assign().name).collect();
            assert_eq!(names.len(), ROSTER_NAMES.len());
        }
    }

    #[test]
    fn color_follows_roster_position() {
        let mut pool = seeded(7);
        for _ in 0..ROSTER_NAMES.len() {
            let identity = pool.assign();
            let pos = ROSTER_NAMES.iter().position(|n| *n == identity.name).unwrap();
            assert_eq!(identity.color, ROSTER_COLORS[pos]);
        }
    }

    #[test]
    fn overflow_still_assigns_from_roster() {
        let mut pool = seeded(3);
        for _ in 0..ROSTER_NAMES.len() {
            pool.assign();
        }
        for _ in 0..10 {
            let extra = pool.assign();
            assert!(ROSTER_NAMES.contains(&extra.name.as_str()));
        }
        assert_eq!(pool.in_use(), ROSTER_NAMES.len());
    }

    #[test]
    fn released_name_is_the_only_one_left() {
        let mut pool = seeded(11);
        let all: Vec<Identity> = (0..ROSTER_NAMES.len()).map(|_| pool.assign()).collect();
        pool.release(&all[2].name);
        assert_eq!(pool.assign(), all[2]);
    }
}
