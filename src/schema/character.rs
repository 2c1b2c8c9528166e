/// Player characters: the shared sheet plus kind-specific payloads.
use serde::{Deserialize, Serialize};

use super::action::Attribute;
use super::gear::{Item, SpecialAbility, Vice};
use super::harm::{HarmPlacement, HarmTrack};
use super::link::{Link, NpcId};
use super::progress::{Clock, Playbook};

/// Most traumas a character can carry before retiring.
pub const MAX_TRAUMAS: usize = 4;

/// Stress boxes on a standard sheet.
pub const STRESS_LIMIT: u32 = 9;

/// Segments on the healing clock.
pub const HEALING_SEGMENTS: u32 = 4;

/// Coin a character can hold on their person.
pub const MAX_COIN: u32 = 4;

/// Coin a character can keep in their stash.
pub const MAX_STASH: u32 = 40;

/// Which sheet a character is played from. Serialized as the `"Class"`
/// discriminator of a character record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Human,
    Vampire,
    Ghost,
    Hull,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Vampire => "Vampire",
            Self::Ghost => "Ghost",
            Self::Hull => "Hull",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        [Self::Human, Self::Vampire, Self::Ghost, Self::Hull]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Ghosts have no body to carry gear with.
    pub fn carries_items(&self) -> bool {
        !matches!(self, Self::Ghost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stress {
    pub level: u32,
    pub limit: u32,
}

impl Stress {
    pub fn new(limit: u32) -> Self {
        Self { level: 0, limit }
    }
}

impl Default for Stress {
    fn default() -> Self {
        Self::new(STRESS_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmorSlot {
    Standard,
    Heavy,
    Special,
}

impl ArmorSlot {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "standard" | "armor" => Some(Self::Standard),
            "heavy" => Some(Self::Heavy),
            "special" => Some(Self::Special),
            _ => None,
        }
    }
}

/// Armor boxes; `true` means the box has been used since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSlots {
    pub standard: bool,
    pub heavy: bool,
    pub special: bool,
}

impl ArmorSlots {
    fn slot_mut(&mut self, slot: ArmorSlot) -> &mut bool {
        match slot {
            ArmorSlot::Standard => &mut self.standard,
            ArmorSlot::Heavy => &mut self.heavy,
            ArmorSlot::Special => &mut self.special,
        }
    }

    pub fn is_used(&self, slot: ArmorSlot) -> bool {
        match slot {
            ArmorSlot::Standard => self.standard,
            ArmorSlot::Heavy => self.heavy,
            ArmorSlot::Special => self.special,
        }
    }
}

/// Load chosen before a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadLevel {
    Light,
    Normal,
    Heavy,
}

impl LoadLevel {
    pub fn capacity(&self) -> u32 {
        match self {
            Self::Light => 3,
            Self::Normal => 5,
            Self::Heavy => 6,
        }
    }
}

/// Fields shared by characters that own things: coin, stash, a vice and
/// their closest friend and rival.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub coin: u32,
    #[serde(default)]
    pub stash: u32,
    #[serde(default)]
    pub vice: Vice,
    #[serde(default)]
    pub friend: Option<Link<NpcId>>,
    #[serde(default)]
    pub enemy: Option<Link<NpcId>>,
}

impl Owner {
    /// Gain or spend coin. Refused (and nothing changes) when the result
    /// would leave `0..=MAX_COIN`.
    pub fn add_coin(&mut self, delta: i32) -> bool {
        match bounded_add(self.coin, delta, MAX_COIN) {
            Some(coin) => {
                self.coin = coin;
                true
            }
            None => false,
        }
    }

    /// Move coin into (or out of) the stash, same policy as `add_coin`.
    pub fn add_stash(&mut self, delta: i32) -> bool {
        match bounded_add(self.stash, delta, MAX_STASH) {
            Some(stash) => {
                self.stash = stash;
                true
            }
            None => false,
        }
    }
}

fn bounded_add(value: u32, delta: i32, max: u32) -> Option<u32> {
    let next = i64::from(value) + i64::from(delta);
    (0..=i64::from(max)).contains(&next).then_some(next as u32)
}

/// Kind-specific part of a character sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Class")]
pub enum Variant {
    Human {
        #[serde(default)]
        owner: Owner,
        #[serde(default)]
        class: String,
    },
    Vampire {
        #[serde(default)]
        owner: Owner,
        #[serde(default)]
        strictures: Vec<String>,
        #[serde(default)]
        dark_servants: Vec<Link<NpcId>>,
    },
    Ghost {
        #[serde(default = "ghost_need")]
        need: Vice,
    },
    Hull {
        #[serde(default)]
        frame: String,
        #[serde(default)]
        frame_features: Vec<String>,
        #[serde(default)]
        functions: Vec<String>,
    },
}

fn ghost_need() -> Vice {
    Vice::new("Need")
}

impl Variant {
    /// Empty payload for a kind.
    pub fn for_kind(kind: Kind) -> Self {
        match kind {
            Kind::Human => Self::Human {
                owner: Owner::default(),
                class: String::new(),
            },
            Kind::Vampire => Self::Vampire {
                owner: Owner::default(),
                strictures: Vec::new(),
                dark_servants: Vec::new(),
            },
            Kind::Ghost => Self::Ghost { need: ghost_need() },
            Kind::Hull => Self::Hull {
                frame: String::new(),
                frame_features: Vec::new(),
                functions: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Human { .. } => Kind::Human,
            Self::Vampire { .. } => Kind::Vampire,
            Self::Ghost { .. } => Kind::Ghost,
            Self::Hull { .. } => Kind::Hull,
        }
    }
}

/// A player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub look: String,
    #[serde(default)]
    pub heritage: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stress: Stress,
    #[serde(default)]
    pub traumas: Vec<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub harms: HarmTrack,
    #[serde(default = "healing_clock")]
    pub healing: Clock,
    #[serde(default)]
    pub armors: ArmorSlots,
    #[serde(default)]
    pub abilities: Vec<SpecialAbility>,
    #[serde(default)]
    pub playbook: Playbook,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub load: u32,
    #[serde(default)]
    pub xp_triggers: Vec<String>,
    #[serde(default)]
    pub downtime_activities: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(flatten)]
    pub variant: Variant,
}

fn healing_clock() -> Clock {
    Clock::new("Healing", HEALING_SEGMENTS)
}

impl Character {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
            look: String::new(),
            heritage: String::new(),
            background: String::new(),
            description: String::new(),
            stress: Stress::default(),
            traumas: Vec::new(),
            items: Vec::new(),
            harms: HarmTrack::new(),
            healing: healing_clock(),
            armors: ArmorSlots::default(),
            abilities: Vec::new(),
            playbook: Playbook::default(),
            attributes: Vec::new(),
            load: 0,
            xp_triggers: Vec::new(),
            downtime_activities: Vec::new(),
            notes: Vec::new(),
            variant: Variant::for_kind(kind),
        }
    }

    pub fn kind(&self) -> Kind {
        self.variant.kind()
    }

    // --- Stress and trauma ---

    /// Take stress. Each full stress track wraps around and becomes one
    /// trauma for the caller to assign; returns how many were earned.
    pub fn add_stress(&mut self, stress: u32) -> u32 {
        let limit = self.stress.limit.max(1);
        let level = self.stress.level.saturating_add(stress);
        let traumas = level / limit;
        self.stress.level = level % limit;
        if traumas > 0 {
            log::debug!("{} overflowed stress into {} trauma", self.name, traumas);
        }
        traumas
    }

    /// Relieve stress, stopping at zero. Returns false when more was
    /// cleared than the character had.
    pub fn clear_stress(&mut self, stress: u32) -> bool {
        match self.stress.level.checked_sub(stress) {
            Some(level) => {
                self.stress.level = level;
                true
            }
            None => {
                self.stress.level = 0;
                false
            }
        }
    }

    /// Mark a trauma. Fails once the character already has four, or when
    /// the same trauma is marked twice.
    pub fn add_trauma(&mut self, trauma: impl Into<String>) -> bool {
        let trauma = trauma.into();
        if self.traumas.len() >= MAX_TRAUMAS
            || self.traumas.iter().any(|t| t.eq_ignore_ascii_case(&trauma))
        {
            return false;
        }
        self.traumas.push(trauma);
        true
    }

    pub fn is_trauma_maxed(&self) -> bool {
        self.traumas.len() >= MAX_TRAUMAS
    }

    // --- Items and load ---

    pub fn carried_load(&self) -> u32 {
        self.items.iter().map(|item| item.weight).sum()
    }

    pub fn set_load(&mut self, load: LoadLevel) {
        self.load = load.capacity();
    }

    /// Use an item. A carried item spends one of its uses; a new item is
    /// picked up (and used) when it fits under the load, or weighs nothing.
    pub fn use_item(&mut self, item: Item) -> bool {
        if let Some(carried) = self.items.iter_mut().find(|i| i.is_named(&item.name)) {
            return carried.use_up();
        }
        if !self.kind().carries_items() {
            return false;
        }
        let fits = item.weight == 0 || self.carried_load() + item.weight <= self.load;
        if !fits {
            return false;
        }
        let mut item = item;
        if !item.use_up() {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Drop everything carried, typically after a score.
    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    // --- Armor ---

    /// Spend an armor box. A box can only be used once until reset.
    pub fn use_armor(&mut self, slot: ArmorSlot) -> bool {
        let used = self.armors.slot_mut(slot);
        if *used {
            return false;
        }
        *used = true;
        true
    }

    pub fn reset_armor(&mut self) {
        self.armors = ArmorSlots::default();
    }

    // --- Harm and healing ---

    pub fn add_harm(&mut self, level: u8, description: impl Into<String>) -> HarmPlacement {
        let placement = self.harms.insert(level, description);
        if placement.is_fatal() {
            log::debug!("{} suffered fatal harm", self.name);
        }
        placement
    }

    /// Tick the healing clock; a filled clock heals every harm one step
    /// and starts over. Returns true when healing happened.
    pub fn heal_tick(&mut self, segments: i32) -> bool {
        if !self.healing.tick(segments) {
            return false;
        }
        self.harms.heal();
        self.healing.reset();
        true
    }

    // --- Attributes and actions ---

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_named(name))
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.is_named(name))
    }

    /// The attribute that holds a given action.
    pub fn attribute_of(&self, action: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.action(action).is_some())
    }

    pub fn action_rating(&self, action: &str) -> Option<u8> {
        self.attributes
            .iter()
            .find_map(|a| a.action_rating(action))
    }

    pub fn action_dots(&mut self, action: &str, dots: i32) -> Option<bool> {
        self.attributes
            .iter_mut()
            .find_map(|a| a.action_dots(action, dots))
    }

    pub fn add_exp(&mut self, delta: i32) -> u32 {
        self.playbook.add_exp(delta)
    }

    pub fn add_attribute_exp(&mut self, attribute: &str, delta: i32) -> Option<u32> {
        self.attribute_mut(attribute).map(|a| a.add_exp(delta))
    }

    pub fn add_ability(&mut self, ability: SpecialAbility) -> bool {
        if self.has_ability(&ability.name) {
            return false;
        }
        self.abilities.push(ability);
        true
    }

    pub fn has_ability(&self, name: &str) -> bool {
        self.abilities.iter().any(|a| a.is_named(name))
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    // --- Kind-specific data ---

    pub fn owner(&self) -> Option<&Owner> {
        match &self.variant {
            Variant::Human { owner, .. } | Variant::Vampire { owner, .. } => Some(owner),
            _ => None,
        }
    }

    pub fn owner_mut(&mut self) -> Option<&mut Owner> {
        match &mut self.variant {
            Variant::Human { owner, .. } | Variant::Vampire { owner, .. } => Some(owner),
            _ => None,
        }
    }

    /// Playbook class of a human; other kinds have none.
    pub fn class(&self) -> Option<&str> {
        match &self.variant {
            Variant::Human { class, .. } => Some(class.as_str()),
            _ => None,
        }
    }

    pub fn vice(&self) -> Option<&Vice> {
        match &self.variant {
            Variant::Human { owner, .. } | Variant::Vampire { owner, .. } => Some(&owner.vice),
            Variant::Ghost { need } => Some(need),
            Variant::Hull { .. } => None,
        }
    }

    /// Add a stricture to a vampire. False for other kinds or duplicates.
    pub fn add_stricture(&mut self, stricture: impl Into<String>) -> bool {
        let Variant::Vampire { strictures, .. } = &mut self.variant else {
            return false;
        };
        let stricture = stricture.into();
        if strictures.contains(&stricture) {
            return false;
        }
        strictures.push(stricture);
        true
    }

    pub fn add_dark_servant(&mut self, servant: Link<NpcId>) -> bool {
        let Variant::Vampire { dark_servants, .. } = &mut self.variant else {
            return false;
        };
        if dark_servants.iter().any(|s| s.name == servant.name) {
            return false;
        }
        dark_servants.push(servant);
        true
    }

    /// Wipe the per-body state a character loses when changing kind.
    pub(crate) fn reset_condition(&mut self, stress_limit: u32) {
        self.stress = Stress::new(stress_limit);
        self.traumas.clear();
        self.items.clear();
        self.harms.clear();
        self.healing = healing_clock();
        self.armors = ArmorSlots::default();
        self.load = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human() -> Character {
        let mut pc = Character::new("Vey", Kind::Human);
        pc.set_load(LoadLevel::Light);
        pc
    }

    #[test]
    fn add_stress_wraps_into_trauma() {
        let mut pc = human();
        pc.stress.level = 7;
        assert_eq!(pc.add_stress(5), 1);
        assert_eq!(pc.stress.level, 3);
    }

    #[test]
    fn add_stress_multiple_tracks() {
        let mut pc = human();
        assert_eq!(pc.add_stress(19), 2);
        assert_eq!(pc.stress.level, 1);
        assert_eq!(pc.add_stress(0), 0);
    }

    #[test]
    fn clear_stress_clamps() {
        let mut pc = human();
        pc.add_stress(3);
        assert!(pc.clear_stress(2));
        assert_eq!(pc.stress.level, 1);
        assert!(!pc.clear_stress(4));
        assert_eq!(pc.stress.level, 0);
    }

    #[test]
    fn trauma_capacity() {
        let mut pc = human();
        for t in ["Cold", "Haunted", "Obsessed", "Paranoid"] {
            assert!(pc.add_trauma(t));
        }
        assert!(pc.is_trauma_maxed());
        assert!(!pc.add_trauma("Reckless"));
        assert_eq!(pc.traumas.len(), 4);
    }

    #[test]
    fn trauma_not_marked_twice() {
        let mut pc = human();
        assert!(pc.add_trauma("Soft"));
        assert!(!pc.add_trauma("soft"));
    }

    #[test]
    fn use_item_respects_load() {
        let mut pc = human();
        assert!(pc.use_item(Item::new("Blade", 1)));
        assert!(pc.use_item(Item::new("Lockpicks", 1)));
        assert!(pc.use_item(Item::new("Cloak", 1)));
        assert!(!pc.use_item(Item::new("Rope", 1)));
        assert!(pc.use_item(Item::new("Trinket", 0)));
        assert_eq!(pc.carried_load(), 3);
    }

    #[test]
    fn use_carried_item_spends_usage() {
        let mut pc = human();
        assert!(pc.use_item(Item::new("Spirit Bottle", 1).with_usages(2)));
        assert_eq!(pc.items[0].usages, 1);
        assert!(pc.use_item(Item::new("spirit bottle", 1)));
        assert!(!pc.use_item(Item::new("Spirit Bottle", 1)));
        assert_eq!(pc.items.len(), 1);
    }

    #[test]
    fn exhausted_new_item_not_picked_up() {
        let mut pc = human();
        assert!(!pc.use_item(Item::new("Empty Flask", 1).with_usages(0)));
        assert!(pc.items.is_empty());
    }

    #[test]
    fn ghosts_carry_nothing() {
        let mut ghost = Character::new("Wisp", Kind::Ghost);
        ghost.load = 6;
        assert!(!ghost.use_item(Item::new("Blade", 1)));
    }

    #[test]
    fn armor_used_once_per_reset() {
        let mut pc = human();
        assert!(pc.use_armor(ArmorSlot::Standard));
        assert!(!pc.use_armor(ArmorSlot::Standard));
        assert!(pc.use_armor(ArmorSlot::Heavy));
        pc.reset_armor();
        assert!(!pc.armors.is_used(ArmorSlot::Standard));
        assert!(pc.use_armor(ArmorSlot::Standard));
    }

    #[test]
    fn armor_slot_names() {
        assert_eq!(ArmorSlot::parse("Heavy"), Some(ArmorSlot::Heavy));
        assert_eq!(ArmorSlot::parse("cloak"), None);
    }

    #[test]
    fn healing_clock_heals_one_step() {
        let mut pc = human();
        pc.add_harm(2, "Broken Leg");
        assert!(!pc.heal_tick(3));
        assert!(pc.heal_tick(1));
        assert_eq!(pc.harms.count(1), 1);
        assert_eq!(pc.harms.count(2), 0);
        assert_eq!(pc.healing.progress, 0);
    }

    #[test]
    fn owner_coin_bounds() {
        let mut pc = human();
        let owner = pc.owner_mut().unwrap();
        assert!(owner.add_coin(4));
        assert!(!owner.add_coin(1));
        assert_eq!(owner.coin, 4);
        assert!(!owner.add_coin(-5));
        assert!(owner.add_stash(40));
        assert!(!owner.add_stash(1));
    }

    #[test]
    fn kind_specific_accessors() {
        let ghost = Character::new("Wisp", Kind::Ghost);
        assert!(ghost.owner().is_none());
        assert_eq!(ghost.vice().map(|v| v.name.as_str()), Some("Need"));
        let hull = Character::new("Iron", Kind::Hull);
        assert!(hull.vice().is_none());
        assert_eq!(Kind::parse("vampire"), Some(Kind::Vampire));
    }

    #[test]
    fn strictures_only_for_vampires() {
        let mut vamp = Character::new("Lady Drake", Kind::Vampire);
        assert!(vamp.add_stricture("Slumber"));
        assert!(!vamp.add_stricture("Slumber"));
        assert!(vamp.add_dark_servant(Link::unresolved("Eddie")));
        let mut pc = human();
        assert!(!pc.add_stricture("Slumber"));
    }
}
