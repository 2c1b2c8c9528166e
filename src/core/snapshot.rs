/// Conversion between entities and flat JSON records, with invariant
/// checks on the way in and the link resolution pass for whole games.
///
/// Links are written as the linked entity's name. Loading a game is two
/// phases: every entity is decoded and validated first, then
/// [`resolve_links`] matches names against the game's NPCs and factions.
/// Names with no match stay unresolved and are reported.
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::game::{Game, GameId, JournalEntry};
use crate::schema::character::{Character, Kind, Variant, MAX_TRAUMAS};
use crate::schema::cohort::{Cohort, COHORT_MAX_HARM};
use crate::schema::gear::{MAX_LAIR_CLAIMS, UNLIMITED_USES};
use crate::schema::link::{FactionId, Link, NpcId};
use crate::schema::npc::Npc;
use crate::schema::organization::{Crew, Faction, HEAT_LIMIT, MAX_STATUS, MAX_WANTED_LEVEL, MIN_STATUS};
use crate::schema::progress::Clock;
use crate::schema::score::{Score, ScoreTarget};

const KINDS: [Kind; 4] = [Kind::Human, Kind::Vampire, Kind::Ghost, Kind::Hull];

/// A flat key-value record as stored by the front end.
pub type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object")]
    NotARecord,
    #[error("unknown character class: {0}")]
    UnknownClass(String),
    #[error("invalid {entity} '{name}': {reason}")]
    Invariant {
        entity: &'static str,
        name: String,
        reason: String,
    },
}

fn invariant(entity: &'static str, name: &str, reason: impl Into<String>) -> SnapshotError {
    SnapshotError::Invariant {
        entity,
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Record conversion for a storable entity.
pub trait Snapshot: Serialize + DeserializeOwned {
    const ENTITY: &'static str;

    fn to_record(&self) -> Result<Record, SnapshotError> {
        match serde_json::to_value(self)? {
            Value::Object(record) => Ok(record),
            _ => Err(SnapshotError::NotARecord),
        }
    }

    /// Decode and validate. Nothing is returned for a record that breaks
    /// an invariant.
    fn from_record(record: Record) -> Result<Self, SnapshotError> {
        let entity: Self = serde_json::from_value(Value::Object(record))?;
        entity.validate()?;
        Ok(entity)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        Ok(())
    }
}

impl Snapshot for Character {
    const ENTITY: &'static str = "character";

    fn from_record(record: Record) -> Result<Self, SnapshotError> {
        match record.get("Class") {
            Some(Value::String(class)) if KINDS.iter().any(|k| k.name() == class) => {}
            Some(Value::String(class)) => return Err(SnapshotError::UnknownClass(class.clone())),
            Some(other) => return Err(SnapshotError::UnknownClass(other.to_string())),
            None => return Err(SnapshotError::UnknownClass(String::new())),
        }
        let pc: Character = serde_json::from_value(Value::Object(record))?;
        pc.validate()?;
        Ok(pc)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let fail = |reason: String| Err(invariant(Self::ENTITY, &self.name, reason));
        if self.stress.limit == 0 {
            return fail("stress limit is zero".into());
        }
        if self.stress.level >= self.stress.limit {
            return fail(format!(
                "stress {} is not below its limit {}",
                self.stress.level, self.stress.limit
            ));
        }
        if self.traumas.len() > MAX_TRAUMAS {
            return fail(format!("{} traumas", self.traumas.len()));
        }
        if !self.harms.within_capacity() {
            return fail("harm track over capacity".into());
        }
        if !self.playbook.exp_in_range() {
            return fail("playbook exp at or over its limit".into());
        }
        for attribute in &self.attributes {
            if !attribute.playbook.exp_in_range() {
                return fail(format!("{} exp at or over its limit", attribute.name));
            }
            if !attribute.has_unique_actions() {
                return fail(format!("duplicate actions in {}", attribute.name));
            }
            if let Some(action) = attribute.actions.iter().find(|a| a.rating > a.limit) {
                return fail(format!("{} rated over its limit", action.name));
            }
        }
        if let Some(item) = self.items.iter().find(|i| i.usages < UNLIMITED_USES) {
            return fail(format!("{} has negative usages", item.name));
        }
        if !self.kind().carries_items() && !self.items.is_empty() {
            return fail(format!("a {} carries no items", self.kind().name()));
        }
        if self.carried_load() > self.load {
            return fail(format!(
                "carried load {} over a load of {}",
                self.carried_load(),
                self.load
            ));
        }
        Ok(())
    }
}

impl Snapshot for Crew {
    const ENTITY: &'static str = "crew";

    fn validate(&self) -> Result<(), SnapshotError> {
        let fail = |reason: String| Err(invariant(Self::ENTITY, self.name(), reason));
        if self.heat >= HEAT_LIMIT {
            return fail(format!("heat {} should have become wanted levels", self.heat));
        }
        if self.wanted_level > MAX_WANTED_LEVEL {
            return fail(format!("wanted level {}", self.wanted_level));
        }
        if !self.playbook.exp_in_range() {
            return fail(format!(
                "playbook exp {} at or over its limit {}",
                self.playbook.exp, self.playbook.exp_limit
            ));
        }
        if self.coins > self.vault_capacity {
            return fail(format!(
                "{} coins in a vault of {}",
                self.coins, self.vault_capacity
            ));
        }
        if self.lair.claims.len() > MAX_LAIR_CLAIMS {
            return fail(format!("{} lair claims", self.lair.claims.len()));
        }
        for cohort in &self.cohorts {
            cohort.validate()?;
        }
        Ok(())
    }
}

impl Snapshot for Faction {
    const ENTITY: &'static str = "faction";

    fn validate(&self) -> Result<(), SnapshotError> {
        if !(MIN_STATUS..=MAX_STATUS).contains(&self.status) {
            return Err(invariant(
                Self::ENTITY,
                self.name(),
                format!("status {}", self.status),
            ));
        }
        Ok(())
    }
}

impl Snapshot for Cohort {
    const ENTITY: &'static str = "cohort";

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.harm > COHORT_MAX_HARM {
            return Err(invariant(
                Self::ENTITY,
                &self.kinds.join(", "),
                format!("harm {}", self.harm),
            ));
        }
        Ok(())
    }
}

impl Snapshot for Npc {
    const ENTITY: &'static str = "npc";
}

impl Snapshot for Clock {
    const ENTITY: &'static str = "clock";
}

impl Snapshot for Score {
    const ENTITY: &'static str = "score";
}

#[derive(Serialize)]
struct GameRecordRef<'a> {
    id: GameId,
    title: &'a str,
    characters: &'a [Character],
    crew: Option<&'a Crew>,
    factions: Vec<&'a Faction>,
    npcs: Vec<&'a Npc>,
    clocks: &'a [Clock],
    scores: &'a [Score],
    journal: &'a [JournalEntry],
}

#[derive(Deserialize)]
struct GameRecord {
    id: GameId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    characters: Vec<Record>,
    #[serde(default)]
    crew: Option<Record>,
    #[serde(default)]
    factions: Vec<Record>,
    #[serde(default)]
    npcs: Vec<Record>,
    #[serde(default)]
    clocks: Vec<Record>,
    #[serde(default)]
    scores: Vec<Record>,
    #[serde(default)]
    journal: Vec<JournalEntry>,
}

fn decode_all<T: Snapshot>(records: Vec<Record>) -> Result<Vec<T>, SnapshotError> {
    records.into_iter().map(T::from_record).collect()
}

impl Game {
    pub fn to_record(&self) -> Result<Record, SnapshotError> {
        let record = GameRecordRef {
            id: self.id,
            title: &self.title,
            characters: &self.characters,
            crew: self.crew.as_ref(),
            factions: self.factions.values().collect(),
            npcs: self.npcs.values().collect(),
            clocks: &self.clocks,
            scores: &self.scores,
            journal: &self.journal,
        };
        match serde_json::to_value(record)? {
            Value::Object(record) => Ok(record),
            _ => Err(SnapshotError::NotARecord),
        }
    }

    /// Restore a game. Every entity is decoded and validated before any
    /// link is resolved; an invalid entity fails the whole load.
    pub fn from_record(record: Record) -> Result<Game, SnapshotError> {
        let raw: GameRecord = serde_json::from_value(Value::Object(record))?;

        let characters = decode_all::<Character>(raw.characters)?;
        let crew = raw.crew.map(Crew::from_record).transpose()?;
        let factions = decode_all::<Faction>(raw.factions)?;
        let npcs = decode_all::<Npc>(raw.npcs)?;
        let clocks = decode_all::<Clock>(raw.clocks)?;
        let scores = decode_all::<Score>(raw.scores)?;

        let mut game = Game::new(raw.id, raw.title);
        for faction in factions {
            game.add_faction(faction);
        }
        for npc in npcs {
            game.add_npc(npc);
        }
        game.characters = characters;
        game.crew = crew;
        game.clocks = clocks;
        game.scores = scores;
        game.journal = raw.journal;

        resolve_links(&mut game);
        Ok(game)
    }
}

/// Name indexes over a game's NPCs and factions. The first entity with a
/// given name wins.
struct NameIndex {
    factions: FxHashMap<String, FactionId>,
    npcs: FxHashMap<String, NpcId>,
}

impl NameIndex {
    fn build(game: &Game) -> Self {
        let mut factions = FxHashMap::default();
        for (id, faction) in game.factions() {
            factions.entry(faction.name().to_string()).or_insert(id);
        }
        let mut npcs = FxHashMap::default();
        for (id, npc) in game.npcs() {
            npcs.entry(npc.name.clone()).or_insert(id);
        }
        Self { factions, npcs }
    }

    fn faction(&self, name: &str) -> Option<FactionId> {
        self.factions.get(name).copied()
    }

    fn npc(&self, name: &str) -> Option<NpcId> {
        self.npcs.get(name).copied()
    }

    fn target(&self, name: &str) -> Option<ScoreTarget> {
        self.faction(name)
            .map(ScoreTarget::Faction)
            .or_else(|| self.npc(name).map(ScoreTarget::Npc))
    }
}

fn resolve<K>(link: &mut Link<K>, lookup: impl Fn(&str) -> Option<K>, dangling: &mut Vec<String>) {
    link.target = lookup(&link.name);
    if link.target.is_none() {
        dangling.push(link.name.clone());
    }
}

/// Point every named link in the game at the entity of that exact name and
/// refresh the score target tiers. Returns the names that matched nothing;
/// their links stay unresolved.
pub fn resolve_links(game: &mut Game) -> Vec<String> {
    let index = NameIndex::build(game);
    let mut dangling = Vec::new();

    for npc in game.npcs.values_mut() {
        if let Some(link) = &mut npc.faction {
            resolve(link, |n| index.faction(n), &mut dangling);
        }
    }

    for pc in &mut game.characters {
        if let Some(owner) = pc.owner_mut() {
            for link in [&mut owner.friend, &mut owner.enemy].into_iter().flatten() {
                resolve(link, |n| index.npc(n), &mut dangling);
            }
        }
        if let Variant::Vampire { dark_servants, .. } = &mut pc.variant {
            for link in dark_servants {
                resolve(link, |n| index.npc(n), &mut dangling);
            }
        }
    }

    if let Some(link) = game.crew.as_mut().and_then(|crew| crew.contact.as_mut()) {
        resolve(link, |n| index.npc(n), &mut dangling);
    }

    for score in &mut game.scores {
        if let Some(link) = &mut score.target {
            resolve(link, |n| index.target(n), &mut dangling);
        }
    }
    game.refresh_scores();

    for name in &dangling {
        log::warn!("game {}: no NPC or faction named '{}'", game.id.0, name);
    }
    dangling
}
