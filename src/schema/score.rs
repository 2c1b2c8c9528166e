use serde::{Deserialize, Serialize};

use super::link::{FactionId, Link, NpcId};
use super::npc::Npc;
use super::organization::Faction;

/// Tier assumed for targets with no known faction.
pub const DEFAULT_TARGET_TIER: u8 = 1;

/// Lookup of the entities a link can point at. Implemented by the game
/// that owns them.
pub trait Directory {
    fn faction(&self, id: FactionId) -> Option<&Faction>;
    fn npc(&self, id: NpcId) -> Option<&Npc>;
}

/// What a score is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTarget {
    Faction(FactionId),
    Npc(NpcId),
}

/// A planned or running heist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub title: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub target: Option<Link<ScoreTarget>>,
    /// Cached from `target`; refreshed whenever the target changes.
    #[serde(default = "default_tier")]
    pub target_tier: u8,
}

fn default_tier() -> u8 {
    DEFAULT_TARGET_TIER
}

impl Score {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            participants: Vec::new(),
            target: None,
            target_tier: DEFAULT_TARGET_TIER,
        }
    }

    pub fn add_participant(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.participants.contains(&name) {
            return false;
        }
        self.participants.push(name);
        true
    }

    /// Tier of the target: a faction's own tier, an NPC's faction tier,
    /// otherwise the default.
    pub fn calc_target_tier(&self, directory: &dyn Directory) -> u8 {
        let Some(target) = self.target.as_ref().and_then(|link| link.target) else {
            return DEFAULT_TARGET_TIER;
        };
        let tier = match target {
            ScoreTarget::Faction(id) => directory.faction(id).map(Faction::tier),
            ScoreTarget::Npc(id) => directory
                .npc(id)
                .and_then(|npc| npc.faction.as_ref())
                .and_then(|link| link.target)
                .and_then(|faction| directory.faction(faction))
                .map(Faction::tier),
        };
        tier.unwrap_or(DEFAULT_TARGET_TIER)
    }

    pub fn set_target(&mut self, target: Option<Link<ScoreTarget>>, directory: &dyn Directory) {
        self.target = target;
        self.refresh_target_tier(directory);
    }

    pub fn refresh_target_tier(&mut self, directory: &dyn Directory) {
        self.target_tier = self.calc_target_tier(directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct World {
        factions: HashMap<FactionId, Faction>,
        npcs: HashMap<NpcId, Npc>,
    }

    impl Directory for World {
        fn faction(&self, id: FactionId) -> Option<&Faction> {
            self.factions.get(&id)
        }

        fn npc(&self, id: NpcId) -> Option<&Npc> {
            self.npcs.get(&id)
        }
    }

    fn world() -> World {
        let mut world = World::default();
        world.factions.insert(FactionId(1), Faction::new("Red Sashes", 2));
        world.npcs.insert(
            NpcId(1),
            Npc::new("Mylera Klev", "Leader")
                .in_faction(Link::resolved("Red Sashes", FactionId(1))),
        );
        world.npcs.insert(NpcId(2), Npc::new("Flint", "Spirit Trafficker"));
        world
    }

    #[test]
    fn faction_target_uses_faction_tier() {
        let world = world();
        let mut score = Score::new("Burn the Sashes' school");
        score.set_target(
            Some(Link::resolved("Red Sashes", ScoreTarget::Faction(FactionId(1)))),
            &world,
        );
        assert_eq!(score.target_tier, 2);
    }

    #[test]
    fn npc_target_uses_their_faction() {
        let world = world();
        let mut score = Score::new("Grab Mylera");
        score.set_target(
            Some(Link::resolved("Mylera Klev", ScoreTarget::Npc(NpcId(1)))),
            &world,
        );
        assert_eq!(score.target_tier, 2);
    }

    #[test]
    fn bare_or_unresolved_target_defaults() {
        let world = world();
        let mut score = Score::new("Rob Flint");
        score.set_target(
            Some(Link::resolved("Flint", ScoreTarget::Npc(NpcId(2)))),
            &world,
        );
        assert_eq!(score.target_tier, DEFAULT_TARGET_TIER);
        score.set_target(Some(Link::unresolved("Nobody")), &world);
        assert_eq!(score.target_tier, DEFAULT_TARGET_TIER);
        score.set_target(None, &world);
        assert_eq!(score.target_tier, DEFAULT_TARGET_TIER);
    }

    #[test]
    fn tier_refreshes_when_faction_changes() {
        let mut world = world();
        let mut score = Score::new("Hit the Sashes");
        score.set_target(
            Some(Link::resolved("Red Sashes", ScoreTarget::Faction(FactionId(1)))),
            &world,
        );
        world.factions.get_mut(&FactionId(1)).unwrap().org.tier = 4;
        score.refresh_target_tier(&world);
        assert_eq!(score.target_tier, 4);
    }
}
