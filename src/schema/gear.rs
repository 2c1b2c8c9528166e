use serde::{Deserialize, Serialize};

/// Usage count meaning "never runs out".
pub const UNLIMITED_USES: i32 = -1;

/// Most claims a lair can hold.
pub const MAX_LAIR_CLAIMS: usize = 6;

/// A piece of equipment a character can bring on a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: u32,
    /// Remaining uses; −1 is unlimited, 0 is exhausted.
    #[serde(default = "unlimited")]
    pub usages: i32,
}

fn unlimited() -> i32 {
    UNLIMITED_USES
}

impl Item {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            weight,
            usages: UNLIMITED_USES,
        }
    }

    pub fn with_usages(mut self, usages: i32) -> Self {
        self.usages = usages;
        self
    }

    /// Spend one use. Returns false when the item is exhausted.
    pub fn use_up(&mut self) -> bool {
        match self.usages {
            UNLIMITED_USES => true,
            n if n > 0 => {
                self.usages -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.usages == 0
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAbility {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl SpecialAbility {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// How a character relieves stress, and who supplies it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vice {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub purveyor: String,
}

impl Vice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Turf, favors or assets held by a lair (or by the prison underworld).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Claim {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lair {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl Lair {
    /// Add a claim unless the lair already holds the maximum.
    pub fn add_claim(&mut self, claim: Claim) -> bool {
        if self.claims.len() >= MAX_LAIR_CLAIMS {
            return false;
        }
        self.claims.push(claim);
        true
    }

    pub fn remove_claim(&mut self, name: &str) -> Option<Claim> {
        let index = self
            .claims
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))?;
        Some(self.claims.remove(index))
    }
}

/// A crew upgrade; repeated purchases raise its quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    pub name: String,
    #[serde(default = "first_quality")]
    pub quality: u8,
}

fn first_quality() -> u8 {
    1
}

impl Upgrade {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quality: 1,
        }
    }
}
