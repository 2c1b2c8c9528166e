use serde::{Deserialize, Serialize};

/// Harm at which a cohort is destroyed.
pub const COHORT_MAX_HARM: u8 = 4;

/// A gang or expert hireling working for a crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    /// Gang types ("Thugs", "Rovers") or the expert's trade.
    #[serde(rename = "type")]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub armor: bool,
    #[serde(default)]
    pub elite: bool,
    #[serde(default)]
    pub harm: u8,
    #[serde(default)]
    pub expert: bool,
    #[serde(default)]
    pub flaws: Vec<String>,
    #[serde(default)]
    pub edges: Vec<String>,
    #[serde(default)]
    pub scale: u8,
    #[serde(default)]
    pub quality: u8,
}

impl Cohort {
    /// A gang at the crew's tier.
    pub fn gang<I, S>(kinds: I, tier: u8) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cohort = Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
            armor: false,
            elite: false,
            harm: 0,
            expert: false,
            flaws: Vec::new(),
            edges: Vec::new(),
            scale: 0,
            quality: 0,
        };
        cohort.sync_tier(tier);
        cohort
    }

    /// A single expert; experts work at scale 0 and one quality above tier.
    pub fn expert(trade: impl Into<String>, tier: u8) -> Self {
        let mut cohort = Self::gang([trade.into()], tier);
        cohort.expert = true;
        cohort.sync_tier(tier);
        cohort
    }

    /// Recompute scale and quality after the crew's tier changed.
    pub fn sync_tier(&mut self, tier: u8) {
        let bonus = u8::from(self.elite || self.expert);
        self.quality = tier.saturating_add(bonus);
        self.scale = if self.expert { 0 } else { tier };
    }

    pub fn make_elite(&mut self, tier: u8) {
        self.elite = true;
        self.sync_tier(tier);
    }

    /// Suffer or recover harm, clamped to `0..=4`. Returns false on clamp.
    pub fn add_harm(&mut self, harm: i32) -> bool {
        let wanted = i32::from(self.harm) + harm;
        let clamped = wanted.clamp(0, i32::from(COHORT_MAX_HARM));
        self.harm = clamped as u8;
        wanted == clamped
    }

    pub fn harm_state(&self) -> &'static str {
        match self.harm {
            0 => "unharmed",
            1 => "weakened",
            2 => "impaired",
            3 => "broken",
            _ => "dead",
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.harm >= COHORT_MAX_HARM
    }
}
