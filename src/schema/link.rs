/// Named references between entities of the same game.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Newtype wrapper for NPC keys within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NpcId(pub u32);

/// Newtype wrapper for faction keys within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

/// A reference to another entity by name, plus the key it resolved to.
///
/// Links that aren't ownership (an NPC's faction, a crew's contact, a
/// character's friend) are stored by name. Loading leaves `target` empty;
/// the game's resolution pass fills it in when a matching entity exists.
/// Only the name is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link<K> {
    pub name: String,
    pub target: Option<K>,
}

impl<K> Link<K> {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
        }
    }

    pub fn resolved(name: impl Into<String>, target: K) -> Self {
        Self {
            name: name.into(),
            target: Some(target),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

impl<K: Copy> Link<K> {
    pub fn key(&self) -> Option<K> {
        self.target
    }
}

impl<K> Serialize for Link<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de, K> Deserialize<'de> for Link<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::unresolved)
    }
}
