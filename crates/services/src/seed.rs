//! Seed issuance for drawing quiz sets.

use std::collections::VecDeque;

use rand::Rng;

use exam_core::Clock;

/// Where fresh sampling seeds come from.
///
/// `WallClock` derives the seed from the clock's millisecond timestamp and
/// mixes in process entropy so back-to-back draws never collide. `Sequence`
/// replays injected seeds (cycling when exhausted) for deterministic tests.
#[derive(Debug, Clone, Default)]
pub enum SeedSource {
    #[default]
    WallClock,
    Sequence(VecDeque<u32>),
}

impl SeedSource {
    #[must_use]
    pub fn wall_clock() -> Self {
        Self::WallClock
    }

    #[must_use]
    pub fn sequence(seeds: impl IntoIterator<Item = u32>) -> Self {
        Self::Sequence(seeds.into_iter().collect())
    }

    /// Issue the next sampling seed.
    pub fn next_seed(&mut self, clock: &Clock) -> u32 {
        match self {
            SeedSource::WallClock => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let millis = clock.now_millis() as u32;
                millis ^ rand::rng().random::<u32>()
            }
            SeedSource::Sequence(seeds) => match seeds.pop_front() {
                Some(seed) => {
                    seeds.push_back(seed);
                    seed
                }
                None => 0,
            },
        }
    }
}
