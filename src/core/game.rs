/// The entity graph of one campaign, and the table that serializes access
/// to many of them.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::schema::character::Character;
use crate::schema::link::{FactionId, Link, NpcId};
use crate::schema::npc::Npc;
use crate::schema::organization::{Crew, Faction};
use crate::schema::progress::Clock;
use crate::schema::score::{Directory, Score, ScoreTarget};

/// Identifies a game across the table and the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

/// Source of fresh game ids, injected into the table.
pub trait IdSequence {
    fn next_id(&mut self) -> GameId;
}

/// Monotonic ids starting from a given value.
#[derive(Debug, Clone)]
pub struct CounterSequence {
    next: u64,
}

impl CounterSequence {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl Default for CounterSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSequence for CounterSequence {
    fn next_id(&mut self) -> GameId {
        let id = GameId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub index: u32,
    pub text: String,
}

/// A campaign: the characters, their crew, and the world they move in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub characters: Vec<Character>,
    pub crew: Option<Crew>,
    pub(crate) factions: BTreeMap<FactionId, Faction>,
    pub(crate) npcs: BTreeMap<NpcId, Npc>,
    pub clocks: Vec<Clock>,
    pub scores: Vec<Score>,
    pub journal: Vec<JournalEntry>,
}

impl Game {
    pub fn new(id: GameId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            characters: Vec::new(),
            crew: None,
            factions: BTreeMap::new(),
            npcs: BTreeMap::new(),
            clocks: Vec::new(),
            scores: Vec::new(),
            journal: Vec::new(),
        }
    }

    // --- World ---

    pub fn add_npc(&mut self, npc: Npc) -> NpcId {
        let id = NpcId(self.npcs.keys().next_back().map_or(1, |k| k.0 + 1));
        self.npcs.insert(id, npc);
        id
    }

    pub fn add_faction(&mut self, faction: Faction) -> FactionId {
        let id = FactionId(self.factions.keys().next_back().map_or(1, |k| k.0 + 1));
        self.factions.insert(id, faction);
        id
    }

    pub fn npcs(&self) -> impl Iterator<Item = (NpcId, &Npc)> {
        self.npcs.iter().map(|(id, npc)| (*id, npc))
    }

    pub fn factions(&self) -> impl Iterator<Item = (FactionId, &Faction)> {
        self.factions.iter().map(|(id, faction)| (*id, faction))
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.get_mut(&id)
    }

    /// Mutable faction access. Call `refresh_scores` after changing a tier.
    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.get_mut(&id)
    }

    pub fn find_npc(&self, name: &str) -> Option<NpcId> {
        self.npcs.iter().find(|(_, n)| n.name == name).map(|(id, _)| *id)
    }

    pub fn find_faction(&self, name: &str) -> Option<FactionId> {
        self.factions
            .iter()
            .find(|(_, f)| f.name() == name)
            .map(|(id, _)| *id)
    }

    /// A link to the named NPC, unresolved if there is none.
    pub fn npc_link(&self, name: &str) -> Link<NpcId> {
        match self.find_npc(name) {
            Some(id) => Link::resolved(name, id),
            None => Link::unresolved(name),
        }
    }

    pub fn faction_link(&self, name: &str) -> Link<FactionId> {
        match self.find_faction(name) {
            Some(id) => Link::resolved(name, id),
            None => Link::unresolved(name),
        }
    }

    /// A score target by name; factions shadow NPCs of the same name.
    pub fn target_link(&self, name: &str) -> Link<ScoreTarget> {
        let target = self
            .find_faction(name)
            .map(ScoreTarget::Faction)
            .or_else(|| self.find_npc(name).map(ScoreTarget::Npc));
        match target {
            Some(target) => Link::resolved(name, target),
            None => Link::unresolved(name),
        }
    }

    // --- Characters ---

    /// Add a character. Names are unique within a game.
    pub fn add_character(&mut self, pc: Character) -> bool {
        if self.character(&pc.name).is_some() {
            return false;
        }
        self.characters.push(pc);
        true
    }

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|pc| pc.name == name)
    }

    pub fn character_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|pc| pc.name == name)
    }

    /// Take a character out, e.g. to migrate it.
    pub fn take_character(&mut self, name: &str) -> Option<Character> {
        let index = self.characters.iter().position(|pc| pc.name == name)?;
        Some(self.characters.remove(index))
    }

    /// Put a character back, replacing any with the same name in place.
    pub fn replace_character(&mut self, pc: Character) -> Option<Character> {
        match self.character_mut(&pc.name) {
            Some(slot) => Some(std::mem::replace(slot, pc)),
            None => {
                self.characters.push(pc);
                None
            }
        }
    }

    // --- Clocks and scores ---

    pub fn add_clock(&mut self, clock: Clock) -> bool {
        if self.clock(&clock.name).is_some() {
            return false;
        }
        self.clocks.push(clock);
        true
    }

    pub fn clock(&self, name: &str) -> Option<&Clock> {
        self.clocks.iter().find(|c| c.name == name)
    }

    /// Tick a named clock. `Some(true)` once it is complete.
    pub fn tick_clock(&mut self, name: &str, delta: i32) -> Option<bool> {
        self.clocks
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| c.tick(delta))
    }

    pub fn remove_clock(&mut self, name: &str) -> Option<Clock> {
        let index = self.clocks.iter().position(|c| c.name == name)?;
        Some(self.clocks.remove(index))
    }

    /// Add a score, computing its target tier against this game.
    pub fn add_score(&mut self, mut score: Score) {
        score.refresh_target_tier(self);
        self.scores.push(score);
    }

    pub fn score(&self, title: &str) -> Option<&Score> {
        self.scores.iter().find(|s| s.title == title)
    }

    /// Aim a score at the named faction or NPC. `None` if there is no such
    /// score, otherwise the resulting target tier.
    pub fn set_score_target(&mut self, title: &str, target: &str) -> Option<u8> {
        let index = self.scores.iter().position(|s| s.title == title)?;
        let link = self.target_link(target);
        self.scores[index].target = Some(link);
        let tier = self.scores[index].calc_target_tier(self);
        self.scores[index].target_tier = tier;
        Some(tier)
    }

    /// Recompute every score's cached target tier.
    pub fn refresh_scores(&mut self) {
        for index in 0..self.scores.len() {
            let tier = self.scores[index].calc_target_tier(self);
            self.scores[index].target_tier = tier;
        }
    }

    // --- Journal ---

    /// Append a journal entry, returning its index.
    pub fn write_journal(&mut self, text: impl Into<String>) -> u32 {
        let index = self.journal.last().map_or(1, |e| e.index + 1);
        self.journal.push(JournalEntry {
            index,
            text: text.into(),
        });
        index
    }
}

impl Directory for Game {
    fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(&id)
    }

    fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(&id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live games keyed by id. Each game has its own lock, so commands against
/// one game run one at a time while other games proceed.
pub struct GameTable<S = CounterSequence> {
    ids: Mutex<S>,
    games: Mutex<FxHashMap<GameId, Arc<Mutex<Game>>>>,
}

impl Default for GameTable<CounterSequence> {
    fn default() -> Self {
        Self::new(CounterSequence::default())
    }
}

impl<S: IdSequence> GameTable<S> {
    pub fn new(ids: S) -> Self {
        Self {
            ids: Mutex::new(ids),
            games: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn create_game(&self, title: impl Into<String>) -> GameId {
        let id = lock(&self.ids).next_id();
        self.insert(Game::new(id, title));
        id
    }

    /// Register a game, e.g. one restored from a snapshot. Returns the game
    /// it replaced.
    pub fn insert(&self, game: Game) -> Option<Arc<Mutex<Game>>> {
        lock(&self.games).insert(game.id, Arc::new(Mutex::new(game)))
    }

    pub fn get(&self, id: GameId) -> Option<Arc<Mutex<Game>>> {
        lock(&self.games).get(&id).cloned()
    }

    pub fn remove(&self, id: GameId) -> Option<Arc<Mutex<Game>>> {
        lock(&self.games).remove(&id)
    }

    /// Run `f` with exclusive access to one game. The table lock is only
    /// held for the lookup.
    pub fn with_game<R>(&self, id: GameId, f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        let game = self.get(id)?;
        let mut guard = lock(&game);
        Some(f(&mut guard))
    }

    pub fn len(&self) -> usize {
        lock(&self.games).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::Kind;

    fn doskvol() -> Game {
        let mut game = Game::new(GameId(1), "Doskvol");
        let sashes = game.add_faction(Faction::new("Red Sashes", 2));
        game.add_npc(Npc::new("Mylera Klev", "Leader").in_faction(Link::resolved("Red Sashes", sashes)));
        game
    }

    #[test]
    fn keys_are_sequential_per_kind() {
        let mut game = doskvol();
        assert_eq!(game.add_faction(Faction::new("Bluecoats", 3)), FactionId(2));
        assert_eq!(game.add_npc(Npc::new("Flint", "Spirit Trafficker")), NpcId(2));
    }

    #[test]
    fn links_by_name() {
        let game = doskvol();
        assert!(game.npc_link("Mylera Klev").is_resolved());
        assert!(!game.npc_link("Nobody").is_resolved());
        assert_eq!(
            game.target_link("Red Sashes").target,
            Some(ScoreTarget::Faction(FactionId(1)))
        );
    }

    #[test]
    fn character_names_unique() {
        let mut game = doskvol();
        assert!(game.add_character(Character::new("Vey", Kind::Human)));
        assert!(!game.add_character(Character::new("Vey", Kind::Ghost)));
        let old = game.replace_character(Character::new("Vey", Kind::Ghost)).unwrap();
        assert_eq!(old.kind(), Kind::Human);
        assert_eq!(game.character("Vey").unwrap().kind(), Kind::Ghost);
        assert_eq!(game.characters.len(), 1);
    }

    #[test]
    fn score_target_tier_follows_faction() {
        let mut game = doskvol();
        game.add_score(Score::new("The Sashes' school"));
        assert_eq!(game.set_score_target("The Sashes' school", "Mylera Klev"), Some(2));
        let id = game.find_faction("Red Sashes").unwrap();
        game.faction_mut(id).unwrap().org.tier = 3;
        game.refresh_scores();
        assert_eq!(game.score("The Sashes' school").unwrap().target_tier, 3);
        assert_eq!(game.set_score_target("Missing", "Red Sashes"), None);
    }

    #[test]
    fn clocks_and_journal() {
        let mut game = doskvol();
        assert!(game.add_clock(Clock::new("Bluecoat crackdown", 4)));
        assert!(!game.add_clock(Clock::new("Bluecoat crackdown", 6)));
        assert_eq!(game.tick_clock("Bluecoat crackdown", 3), Some(false));
        assert_eq!(game.tick_clock("Bluecoat crackdown", 1), Some(true));
        assert_eq!(game.tick_clock("Missing", 1), None);
        assert_eq!(game.write_journal("The crew met at the Leaky Bucket."), 1);
        assert_eq!(game.write_journal("Vey was arrested."), 2);
    }

    #[test]
    fn ids_come_from_the_sequence() {
        let table = GameTable::new(CounterSequence::starting_at(100));
        assert_eq!(table.create_game("One"), GameId(100));
        assert_eq!(table.create_game("Two"), GameId(101));
        assert_eq!(table.len(), 2);
        assert_eq!(table.with_game(GameId(101), |g| g.title.clone()).as_deref(), Some("Two"));
        assert!(table.with_game(GameId(7), |_| ()).is_none());
    }

    #[test]
    fn commands_on_one_game_are_serialized() {
        let table = GameTable::default();
        let id = table.create_game("Doskvol");
        table.with_game(id, |g| g.add_clock(Clock::new("Heist", 1000)));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        table.with_game(id, |g| g.tick_clock("Heist", 1));
                    }
                });
            }
        });

        let progress = table.with_game(id, |g| g.clock("Heist").map(|c| c.progress));
        assert_eq!(progress, Some(Some(800)));
    }
}
