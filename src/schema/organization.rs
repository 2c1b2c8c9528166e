/// Organizations: the player crew and the factions of the city.
use serde::{Deserialize, Serialize};

use super::cohort::Cohort;
use super::gear::{Claim, Lair, SpecialAbility, Upgrade};
use super::link::{Link, NpcId};
use super::progress::Playbook;
use super::score::Score;

/// Heat that converts into one wanted level.
pub const HEAT_LIMIT: u32 = 9;

/// Highest wanted level.
pub const MAX_WANTED_LEVEL: u8 = 4;

/// Rep needed per tier before turf claims lower the bar.
pub const REP_THRESHOLD: u32 = 12;

/// Coin a crew can hold before upgrading its vault.
pub const VAULT_CAPACITY: u32 = 4;

/// Coin paid per tier when advancing.
pub const TIER_COST_MULTIPLIER: u32 = 8;

/// Faction status bounds.
pub const MIN_STATUS: i8 = -3;
pub const MAX_STATUS: i8 = 3;

/// Name, tier and hold shared by crews and factions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub tier: u8,
    /// Strong hold is `true`, weak hold is `false`.
    #[serde(default = "strong_hold")]
    pub hold: bool,
}

fn strong_hold() -> bool {
    true
}

impl Organization {
    pub fn new(name: impl Into<String>, tier: u8) -> Self {
        Self {
            name: name.into(),
            tier,
            hold: true,
        }
    }

    /// Grow in tier. Only possible with strong hold, which the growth
    /// spends; returns false (and changes nothing) on weak hold.
    pub fn add_tier(&mut self, tiers: u8) -> bool {
        if !self.hold {
            return false;
        }
        self.hold = false;
        self.tier = self.tier.saturating_add(tiers);
        log::debug!("{} advanced to tier {}", self.name, self.tier);
        true
    }

    /// Lose hold: strong drops to weak, weak drops a tier and leaves the
    /// organization strong at the lower tier. Returns true if a tier was lost.
    pub fn lose_hold(&mut self) -> bool {
        if self.hold {
            self.hold = false;
            return false;
        }
        self.hold = true;
        if self.tier == 0 {
            return false;
        }
        self.tier -= 1;
        true
    }
}

/// The players' crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    #[serde(flatten)]
    pub org: Organization,
    #[serde(rename = "type", default)]
    pub crew_type: String,
    #[serde(default)]
    pub reputation: String,
    #[serde(default)]
    pub lair: Lair,
    #[serde(default)]
    pub upgrades: Vec<Upgrade>,
    #[serde(default)]
    pub contact: Option<Link<NpcId>>,
    #[serde(default)]
    pub abilities: Vec<SpecialAbility>,
    #[serde(default)]
    pub rep: u32,
    #[serde(default)]
    pub heat: u32,
    #[serde(default)]
    pub wanted_level: u8,
    #[serde(default)]
    pub playbook: Playbook,
    #[serde(default)]
    pub cohorts: Vec<Cohort>,
    #[serde(default)]
    pub coins: u32,
    #[serde(default = "vault_capacity")]
    pub vault_capacity: u32,
    #[serde(default)]
    pub prison_claims: Vec<Claim>,
    #[serde(default)]
    pub xp_triggers: Vec<String>,
    #[serde(default)]
    pub description: String,
}

fn vault_capacity() -> u32 {
    VAULT_CAPACITY
}

impl Crew {
    pub fn new(name: impl Into<String>, crew_type: impl Into<String>) -> Self {
        Self {
            org: Organization::new(name, 0),
            crew_type: crew_type.into(),
            reputation: String::new(),
            lair: Lair::default(),
            upgrades: Vec::new(),
            contact: None,
            abilities: Vec::new(),
            rep: 0,
            heat: 0,
            wanted_level: 0,
            playbook: Playbook::default(),
            cohorts: Vec::new(),
            coins: 0,
            vault_capacity: VAULT_CAPACITY,
            prison_claims: Vec::new(),
            xp_triggers: Vec::new(),
            description: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.org.name
    }

    pub fn tier(&self) -> u8 {
        self.org.tier
    }

    // --- Rep and tier ---

    /// Rep needed to fill the track; every claim held lowers it by one.
    pub fn rep_threshold(&self) -> u32 {
        REP_THRESHOLD.saturating_sub(self.lair.claims.len() as u32)
    }

    /// Gain rep. A full track on weak hold makes the hold strong and keeps
    /// the rep. On strong hold the track empties (remainder kept) and the
    /// coin cost of the next tier is returned; paying it and calling
    /// `add_tier` is up to the caller.
    pub fn add_rep(&mut self, rep: u32) -> Option<u32> {
        self.rep = self.rep.saturating_add(rep);
        let threshold = self.rep_threshold();
        if threshold == 0 || self.rep < threshold {
            return None;
        }
        if !self.org.hold {
            self.org.hold = true;
            log::debug!("{} filled its rep track and regained hold", self.org.name);
            return None;
        }
        self.rep %= threshold;
        Some((u32::from(self.org.tier) + 1) * TIER_COST_MULTIPLIER)
    }

    /// Rep earned for a score against a target of the given tier.
    pub fn calc_rep(&self, target_tier: u8) -> i32 {
        2 + i32::from(target_tier) - i32::from(self.org.tier)
    }

    pub fn rep_for(&self, score: &Score) -> i32 {
        self.calc_rep(score.target_tier)
    }

    /// Advance tier (see `Organization::add_tier`), bringing cohorts along.
    pub fn add_tier(&mut self, tiers: u8) -> bool {
        if !self.org.add_tier(tiers) {
            return false;
        }
        self.sync_cohorts();
        true
    }

    pub fn lose_hold(&mut self) -> bool {
        let lost = self.org.lose_hold();
        if lost {
            self.sync_cohorts();
        }
        lost
    }

    // --- Heat ---

    /// Gain heat; every full 9 becomes a wanted level. Returns the number
    /// of wanted levels the heat converted into.
    pub fn add_heat(&mut self, heat: u32) -> u8 {
        self.heat = self.heat.saturating_add(heat);
        if self.heat < HEAT_LIMIT {
            return 0;
        }
        let levels = u8::try_from(self.heat / HEAT_LIMIT).unwrap_or(u8::MAX);
        self.heat %= HEAT_LIMIT;
        self.add_wanted_level(i32::from(levels));
        log::debug!(
            "{} heat overflowed, wanted level now {}",
            self.org.name,
            self.wanted_level
        );
        levels
    }

    /// Lower heat, stopping at zero. False when clamped.
    pub fn clear_heat(&mut self, heat: u32) -> bool {
        match self.heat.checked_sub(heat) {
            Some(h) => {
                self.heat = h;
                true
            }
            None => {
                self.heat = 0;
                false
            }
        }
    }

    /// Adjust wanted level within `0..=4`. False when clamped.
    pub fn add_wanted_level(&mut self, levels: i32) -> bool {
        let wanted = i32::from(self.wanted_level) + levels;
        let clamped = wanted.clamp(0, i32::from(MAX_WANTED_LEVEL));
        self.wanted_level = clamped as u8;
        wanted == clamped
    }

    // --- Coin ---

    /// Whether `delta` coin can be added (or removed) without leaving
    /// `0..=vault_capacity`.
    pub fn can_store(&self, delta: i32) -> bool {
        let coins = i64::from(self.coins) + i64::from(delta);
        (0..=i64::from(self.vault_capacity)).contains(&coins)
    }

    /// Add or spend coin; refused entirely when out of bounds.
    pub fn add_coin(&mut self, delta: i32) -> bool {
        if !self.can_store(delta) {
            return false;
        }
        self.coins = (i64::from(self.coins) + i64::from(delta)) as u32;
        true
    }

    pub fn upgrade_vault(&mut self) {
        self.vault_capacity = self.vault_capacity.saturating_mul(2);
    }

    // --- Claims ---

    pub fn add_lair_claim(&mut self, claim: Claim) -> bool {
        self.lair.add_claim(claim)
    }

    pub fn remove_lair_claim(&mut self, name: &str) -> Option<Claim> {
        self.lair.remove_claim(name)
    }

    pub fn add_prison_claim(&mut self, claim: Claim) {
        self.prison_claims.push(claim);
    }

    // --- Upgrades ---

    pub fn upgrade(&self, name: &str) -> Option<&Upgrade> {
        self.upgrades
            .iter()
            .find(|u| u.name.eq_ignore_ascii_case(name))
    }

    /// Buy an upgrade or raise its quality. Returns the new quality.
    pub fn add_upgrade(&mut self, name: &str) -> u8 {
        if let Some(upgrade) = self
            .upgrades
            .iter_mut()
            .find(|u| u.name.eq_ignore_ascii_case(name))
        {
            upgrade.quality = upgrade.quality.saturating_add(1);
            return upgrade.quality;
        }
        self.upgrades.push(Upgrade::new(name));
        1
    }

    /// Remove an upgrade entirely, whatever its quality.
    pub fn remove_upgrade(&mut self, name: &str) -> bool {
        let before = self.upgrades.len();
        self.upgrades.retain(|u| !u.name.eq_ignore_ascii_case(name));
        self.upgrades.len() != before
    }

    // --- Cohorts and abilities ---

    pub fn add_cohort(&mut self, mut cohort: Cohort) {
        cohort.sync_tier(self.org.tier);
        self.cohorts.push(cohort);
    }

    fn sync_cohorts(&mut self) {
        let tier = self.org.tier;
        for cohort in &mut self.cohorts {
            cohort.sync_tier(tier);
        }
    }

    pub fn add_ability(&mut self, ability: SpecialAbility) -> bool {
        if self.abilities.iter().any(|a| a.is_named(&ability.name)) {
            return false;
        }
        self.abilities.push(ability);
        true
    }

    pub fn add_exp(&mut self, delta: i32) -> u32 {
        self.playbook.add_exp(delta)
    }
}

/// A faction of the city and where the crew stands with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    #[serde(flatten)]
    pub org: Organization,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub status: i8,
    #[serde(default)]
    pub description: String,
}

impl Faction {
    pub fn new(name: impl Into<String>, tier: u8) -> Self {
        Self {
            org: Organization::new(name, tier),
            district: String::new(),
            status: 0,
            description: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.org.name
    }

    pub fn tier(&self) -> u8 {
        self.org.tier
    }

    /// Shift the crew's status with this faction within `-3..=3`. Landing
    /// on −3 means the faction goes to war; a message saying so is returned.
    pub fn add_status(&mut self, delta: i32) -> Option<String> {
        let status = (i32::from(self.status) + delta)
            .clamp(i32::from(MIN_STATUS), i32::from(MAX_STATUS));
        self.status = status as i8;
        (self.status == MIN_STATUS).then(|| format!("{} is at war with the crew!", self.org.name))
    }

    pub fn at_war(&self) -> bool {
        self.status == MIN_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crew() -> Crew {
        let mut crew = Crew::new("The Lampblacks", "Bravos");
        crew.org.tier = 1;
        crew
    }

    #[test]
    fn rep_pays_for_tier_on_strong_hold() {
        let mut crew = crew();
        assert_eq!(crew.add_rep(11), None);
        assert_eq!(crew.rep, 11);
        assert_eq!(crew.add_rep(1), Some(16));
        assert_eq!(crew.rep, 0);
    }

    #[test]
    fn rep_on_weak_hold_restores_hold_and_keeps_rep() {
        let mut crew = crew();
        crew.org.hold = false;
        assert_eq!(crew.add_rep(13), None);
        assert!(crew.org.hold);
        assert_eq!(crew.rep, 13);
        assert_eq!(crew.add_rep(0), Some(16));
        assert_eq!(crew.rep, 1);
    }

    #[test]
    fn claims_lower_rep_threshold() {
        let mut crew = crew();
        crew.add_lair_claim(Claim::new("Turf"));
        crew.add_lair_claim(Claim::new("Fighting Pits"));
        assert_eq!(crew.rep_threshold(), 10);
        assert_eq!(crew.add_rep(10), Some(16));
    }

    #[test]
    fn calc_rep_relative_to_tier() {
        let crew = crew();
        assert_eq!(crew.calc_rep(1), 2);
        assert_eq!(crew.calc_rep(3), 4);
        let mut strong = crew.clone();
        strong.org.tier = 4;
        assert_eq!(strong.calc_rep(0), -2);
    }

    #[test]
    fn tier_growth_spends_hold() {
        let mut crew = crew();
        crew.add_cohort(Cohort::gang(["Thugs"], 0));
        assert!(crew.add_tier(1));
        assert_eq!(crew.tier(), 2);
        assert!(!crew.org.hold);
        assert_eq!(crew.cohorts[0].quality, 2);
        assert!(!crew.add_tier(1));
        assert_eq!(crew.tier(), 2);
    }

    #[test]
    fn losing_weak_hold_drops_tier() {
        let mut crew = crew();
        assert!(!crew.lose_hold());
        assert!(!crew.org.hold);
        assert!(crew.lose_hold());
        assert_eq!(crew.tier(), 0);
        assert!(crew.org.hold);
    }

    #[test]
    fn heat_overflows_into_wanted_level() {
        let mut crew = crew();
        assert_eq!(crew.add_heat(17), 1);
        assert_eq!(crew.heat, 8);
        assert_eq!(crew.wanted_level, 1);
    }

    #[test]
    fn wanted_level_caps_at_four() {
        let mut crew = crew();
        crew.add_heat(9 * 6);
        assert_eq!(crew.wanted_level, MAX_WANTED_LEVEL);
        assert_eq!(crew.heat, 0);
        assert_eq!(crew.add_heat(u32::MAX), u8::MAX);
        assert!(!crew.add_wanted_level(1));
        assert!(!crew.add_wanted_level(-5));
        assert_eq!(crew.wanted_level, 0);
    }

    #[test]
    fn clear_heat_clamps() {
        let mut crew = crew();
        crew.add_heat(3);
        assert!(crew.clear_heat(2));
        assert!(!crew.clear_heat(2));
        assert_eq!(crew.heat, 0);
    }

    #[test]
    fn vault_is_a_hard_ceiling() {
        let mut crew = crew();
        assert!(crew.add_coin(4));
        assert!(!crew.can_store(1));
        assert!(!crew.add_coin(1));
        assert_eq!(crew.coins, 4);
        crew.upgrade_vault();
        assert_eq!(crew.vault_capacity, 8);
        assert!(crew.add_coin(4));
        assert!(!crew.add_coin(-9));
        assert_eq!(crew.coins, 8);
    }

    #[test]
    fn upgrades_by_name() {
        let mut crew = crew();
        assert_eq!(crew.add_upgrade("Carriage"), 1);
        assert_eq!(crew.add_upgrade("carriage"), 2);
        assert_eq!(crew.upgrade("CARRIAGE").map(|u| u.quality), Some(2));
        assert!(crew.remove_upgrade("Carriage"));
        assert!(crew.upgrade("Carriage").is_none());
        assert!(!crew.remove_upgrade("Carriage"));
    }

    #[test]
    fn faction_status_war() {
        let mut faction = Faction::new("Bluecoats", 3);
        assert_eq!(faction.add_status(-2), None);
        let message = faction.add_status(-5).unwrap();
        assert!(message.contains("Bluecoats"));
        assert_eq!(faction.status, MIN_STATUS);
        assert!(faction.at_war());
        assert_eq!(faction.add_status(9), None);
        assert_eq!(faction.status, MAX_STATUS);
    }
}
