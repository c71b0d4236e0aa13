//! Display-name generation for new sessions.

use knightwire_core::rng::DeterministicRng;

const ADJECTIVES: [&str; 16] = [
    "Quick", "Bright", "Bold", "Lucky", "Clever", "Swift", "Calm", "Brave", "Keen", "Noble", "Sly",
    "Witty", "Silent", "Fierce", "Gentle", "Steady",
];

const NOUNS: [&str; 16] = [
    "Tiger", "Hawk", "Panda", "Fox", "Eagle", "Wolf", "Otter", "Falcon", "Badger", "Lynx", "Raven",
    "Heron", "Bison", "Cobra", "Moose", "Owl",
];

/// Random draws attempted before falling back to a numeric suffix.
const MAX_DRAWS: usize = 16;

/// Generates adjective+noun identities such as `QuickTiger`.
///
/// Holds one RNG for the life of the process. Callers pass a predicate that
/// reports which names are already live; the generator never returns one of
/// those.
pub struct IdentityGenerator {
    rng: Box<dyn DeterministicRng>,
    suffix: u64,
}

impl IdentityGenerator {
    /// Creates a generator around an already-seeded RNG.
    #[must_use]
    pub fn new(rng: Box<dyn DeterministicRng>) -> Self {
        Self { rng, suffix: 0 }
    }

    /// Returns a name for which `is_taken` is false.
    pub fn generate(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        let mut candidate = String::new();
        for _ in 0..MAX_DRAWS {
            candidate = self.draw();
            if !is_taken(&candidate) {
                return candidate;
            }
        }

        // The word space is crowded; disambiguate the last draw.
        loop {
            self.suffix += 1;
            let suffixed = format!("{candidate}{}", self.suffix);
            if !is_taken(&suffixed) {
                return suffixed;
            }
        }
    }

    fn draw(&mut self) -> String {
        let adjective = ADJECTIVES[self.pick(ADJECTIVES.len())];
        let noun = NOUNS[self.pick(NOUNS.len())];
        format!("{adjective}{noun}")
    }

    fn pick(&mut self, len: usize) -> usize {
        let max = u32::try_from(len - 1).unwrap_or(u32::MAX);
        self.rng.next_u32_range(0, max) as usize % len
    }
}

impl std::fmt::Debug for IdentityGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGenerator")
            .field("suffix", &self.suffix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use knightwire_core::rng::StdRngSource;
    use knightwire_test_support::{MockRng, SequenceRng};

    use super::*;

    #[test]
    fn test_generate_combines_adjective_and_noun() {
        let mut generator = IdentityGenerator::new(Box::new(SequenceRng::new(vec![0, 0])));

        let identity = generator.generate(|_| false);

        assert_eq!(identity, "QuickTiger");
    }

    #[test]
    fn test_generate_skips_taken_names() {
        // First draw collides, second draw (Bright + Hawk) is free.
        let mut generator =
            IdentityGenerator::new(Box::new(SequenceRng::new(vec![0, 0, 1, 1])));

        let identity = generator.generate(|name| name == "QuickTiger");

        assert_eq!(identity, "BrightHawk");
    }

    #[test]
    fn test_generate_falls_back_to_suffix_when_draws_collide() {
        let mut generator = IdentityGenerator::new(Box::new(MockRng));

        let first = generator.generate(|name| name == "QuickTiger");
        let second = generator.generate(|name| name == "QuickTiger" || name == "QuickTiger1");

        assert_eq!(first, "QuickTiger1");
        assert_eq!(second, "QuickTiger2");
    }

    #[test]
    fn test_generate_never_repeats_live_identity() {
        let mut generator = IdentityGenerator::new(Box::new(StdRngSource::seeded(11)));
        let mut live = HashSet::new();

        // Far more names than the 256 word combinations.
        for _ in 0..1_000 {
            let identity = generator.generate(|name| live.contains(name));
            assert!(live.insert(identity));
        }
    }
}
