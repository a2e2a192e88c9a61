//! Astronomy trivia served by the "random fact" button.

use rand::Rng;
use rand::seq::SliceRandom;

pub const ASTRONOMY_FACTS: [&str; 14] = [
    "🌌 Jupiter is the largest planet in the Solar System, more than twice as massive as all the other planets combined.",
    "⚡️ Light travels at about 299,792 km per second, the fastest any information can move through the universe.",
    "✨ The Milky Way is a barred spiral galaxy holding hundreds of billions of stars, our Sun among them.",
    "⚫️ A black hole's gravity is so strong that not even light can escape it.",
    "🌕 The Moon is Earth's only natural satellite, and its gravity drives the ocean tides.",
    "🔥 Venus is the hottest planet in the Solar System, with a surface temperature of about 462 °C, hotter than Mercury.",
    "🪐 Saturn is famous for its intricate rings, made mostly of ice particles and rock.",
    "🔭 The Hubble Space Telescope has orbited Earth since 1990, returning a wealth of stunning images and data.",
    "💫 The Orion Nebula is an active star-forming region about 1,344 light-years away, visible to the naked eye.",
    "🕰️ The universe is estimated to be about 13.8 billion years old, derived from measuring its expansion.",
    "🌠 Meteors are grains of space rock and dust that burn up from friction as they enter Earth's atmosphere.",
    "☀️ The Sun is a yellow dwarf in one of the Milky Way's spiral arms, the ultimate source of energy for life on Earth.",
    "🥶 Pluto is now classified as a dwarf planet; it lives in the Kuiper Belt, a region full of icy bodies.",
    "👽 Scientists are actively searching for life beyond the Solar System, especially on planets that may hold liquid water.",
];

/// Picks one fact uniformly at random.
pub fn random_fact<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    ASTRONOMY_FACTS.choose(rng).copied().unwrap_or(ASTRONOMY_FACTS[0])
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_random_fact_is_from_the_list() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(ASTRONOMY_FACTS.contains(&random_fact(&mut rng)));
        }
    }

    #[test]
    fn test_random_fact_varies() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: std::collections::HashSet<_> = (0..200).map(|_| random_fact(&mut rng)).collect();
        assert!(seen.len() > 1);
    }
}
