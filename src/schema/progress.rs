/// Progress counters: segmented clocks and experience playbooks.
use serde::{Deserialize, Serialize};

/// Experience needed per advance on a character or crew playbook.
pub const PLAYBOOK_EXP_LIMIT: u32 = 8;

/// Experience needed per advance on an attribute track.
pub const ATTRIBUTE_EXP_LIMIT: u32 = 6;

/// A segmented progress meter used for projects, countdowns and healing.
///
/// Progress never drops below zero. Completion is only signalled; the caller
/// decides whether to reset or discard a filled clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub name: String,
    pub segments: u32,
    #[serde(default)]
    pub progress: u32,
}

impl Clock {
    pub fn new(name: impl Into<String>, segments: u32) -> Self {
        Self {
            name: name.into(),
            segments,
            progress: 0,
        }
    }

    /// Add `delta` segments (negative values roll the clock back, stopping
    /// at zero). Returns true when the clock is filled.
    pub fn tick(&mut self, delta: i32) -> bool {
        let progress = i64::from(self.progress) + i64::from(delta);
        self.progress = progress.clamp(0, i64::from(u32::MAX)) as u32;
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.segments
    }

    pub fn reset(&mut self) {
        self.progress = 0;
    }
}

/// Long-term experience track. Every `exp_limit` experience crossed
/// becomes one advancement point, the remainder stays on the track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
    #[serde(default)]
    pub exp: u32,
    pub exp_limit: u32,
    #[serde(default)]
    pub points: u32,
}

impl Default for Playbook {
    fn default() -> Self {
        Self::with_limit(PLAYBOOK_EXP_LIMIT)
    }
}

impl Playbook {
    pub fn with_limit(exp_limit: u32) -> Self {
        Self {
            exp: 0,
            exp_limit,
            points: 0,
        }
    }

    /// Mark experience. Returns the number of points earned by this call.
    pub fn add_exp(&mut self, delta: i32) -> u32 {
        let exp = (i64::from(self.exp) + i64::from(delta)).max(0);
        if self.exp_limit == 0 {
            self.exp = 0;
            return 0;
        }

        let limit = i64::from(self.exp_limit);
        let gained = exp / limit;
        self.exp = (exp % limit) as u32;
        if gained > 0 {
            self.add_points(gained.min(i64::from(i32::MAX)) as i32);
        }
        gained as u32
    }

    /// True when the stored exp sits below the limit (or is zero on a
    /// track with no limit).
    pub fn exp_in_range(&self) -> bool {
        if self.exp_limit == 0 {
            self.exp == 0
        } else {
            self.exp < self.exp_limit
        }
    }

    /// Add (or spend, when negative) advancement points. Returns false when
    /// the result would have gone below zero and was clamped.
    pub fn add_points(&mut self, delta: i32) -> bool {
        let points = i64::from(self.points) + i64::from(delta);
        if points < 0 {
            self.points = 0;
            false
        } else {
            self.points = points.min(i64::from(u32::MAX)) as u32;
            true
        }
    }
}
