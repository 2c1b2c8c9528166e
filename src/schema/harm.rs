use serde::{Deserialize, Serialize};

/// Number of severity levels stored on a harm track.
pub const HARM_LEVELS: u8 = 3;

/// The level reported when harm overflows the track: dying, dead, or
/// otherwise taken out. Never stored.
pub const FATAL_HARM: u8 = HARM_LEVELS + 1;

const CAPACITY: [usize; HARM_LEVELS as usize] = [2, 2, 1];

/// Where a newly suffered harm ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarmPlacement {
    /// Stored at the given level (1..=3).
    Placed(u8),
    /// Every slot at or above the requested level was taken.
    Fatal,
}

impl HarmPlacement {
    /// Numeric level of the placement; `Fatal` reports level 4.
    pub fn level(&self) -> u8 {
        match self {
            Self::Placed(level) => *level,
            Self::Fatal => FATAL_HARM,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Three severity levels of free-text harm descriptions.
///
/// Levels 1 and 2 hold two entries each, level 3 holds one. Harm that
/// finds no free slot rolls up to the next level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmTrack {
    levels: [Vec<String>; HARM_LEVELS as usize],
}

impl HarmTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record harm at `level`, escalating while the level is full.
    /// A fatal placement leaves the track untouched.
    pub fn insert(&mut self, level: u8, description: impl Into<String>) -> HarmPlacement {
        let mut level = level.max(1);
        while level <= HARM_LEVELS {
            let slot = usize::from(level - 1);
            if self.levels[slot].len() < CAPACITY[slot] {
                self.levels[slot].push(description.into());
                return HarmPlacement::Placed(level);
            }
            level += 1;
        }
        log::debug!("harm overflowed the track");
        HarmPlacement::Fatal
    }

    /// Downgrade every harm one step: level 1 is cleared, the rest move down.
    pub fn heal(&mut self) {
        let [first, second, third] = &mut self.levels;
        *first = std::mem::take(second);
        *second = std::mem::take(third);
    }

    /// Occupancy of a level; zero for levels outside 1..=3.
    pub fn count(&self, level: u8) -> usize {
        self.level(level).map_or(0, |entries| entries.len())
    }

    /// Entries stored at a level.
    pub fn level(&self, level: u8) -> Option<&[String]> {
        match level {
            1..=HARM_LEVELS => Some(&self.levels[usize::from(level - 1)]),
            _ => None,
        }
    }

    pub fn levels(&self) -> &[Vec<String>; HARM_LEVELS as usize] {
        &self.levels
    }

    pub fn clear(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }

    /// Moderate or severe harm costs a die on affected actions.
    pub fn dice_penalty(&self) -> u8 {
        u8::from(!self.levels[1].is_empty())
    }

    /// Severe harm means the character can't act without help.
    pub fn needs_help(&self) -> bool {
        !self.levels[2].is_empty()
    }

    /// True when no level is over its capacity.
    pub fn within_capacity(&self) -> bool {
        self.levels
            .iter()
            .zip(CAPACITY)
            .all(|(entries, cap)| entries.len() <= cap)
    }
}
