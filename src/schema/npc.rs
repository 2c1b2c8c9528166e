use serde::{Deserialize, Serialize};

use super::link::{FactionId, Link};

/// A non-player character: contacts, friends, rivals, servants, targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub faction: Option<Link<FactionId>>,
    #[serde(default)]
    pub description: String,
}

impl Npc {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            faction: None,
            description: String::new(),
        }
    }

    pub fn in_faction(mut self, faction: Link<FactionId>) -> Self {
        self.faction = Some(faction);
        self
    }
}
