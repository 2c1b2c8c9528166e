/// The rules engine facade: builds sheets from the rules catalog, applies
/// kind changes and rolls dice for characters.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use thiserror::Error;

use crate::core::catalog::{CatalogError, RulesBook, RulesCatalog};
use crate::core::migration;
use crate::core::roll::{DicePool, Position, RollOutcome};
use crate::core::snapshot::SnapshotError;
use crate::schema::character::{Character, Kind, Variant};
use crate::schema::cohort::Cohort;
use crate::schema::organization::Crew;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("unknown class: {0}")]
    UnknownClass(String),
    #[error("unknown crew type: {0}")]
    UnknownCrewType(String),
    #[error("cannot migrate a {from:?} to {to:?}")]
    MigrationUnsupported { from: Kind, to: Kind },
    #[error("a {0:?} has no class to change")]
    ClassChangeUnsupported(Kind),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
}

/// An action roll and what it did to the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRoll {
    pub pool: DicePool,
    pub outcome: RollOutcome,
    /// Attribute that marked experience for a desperate roll.
    pub exp_marked: Option<String>,
}

/// A resistance roll and the stress it cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResistanceRoll {
    pub pool: DicePool,
    /// Stress taken; negative when stress was cleared.
    pub stress: i32,
    pub traumas: u32,
}

/// The rules engine. Built via `RulesEngine::builder()`.
pub struct RulesEngine {
    catalog: Box<dyn RulesCatalog + Send + Sync>,
    seed: u64,
    roll_count: u64,
}

/// Builder for constructing a `RulesEngine`.
pub struct RulesEngineBuilder {
    rules_dir: Option<String>,
    seed: u64,
    /// Directly provided rules (for testing without files).
    rules: Option<RulesBook>,
    /// A catalog other than a `RulesBook`, e.g. one backed by the store.
    catalog: Option<Box<dyn RulesCatalog + Send + Sync>>,
}

impl RulesEngine {
    pub fn builder() -> RulesEngineBuilder {
        RulesEngineBuilder {
            rules_dir: None,
            seed: 0,
            rules: None,
            catalog: None,
        }
    }

    pub fn catalog(&self) -> &dyn RulesCatalog {
        &*self.catalog
    }

    /// A fresh character sheet. Humans need a class from the catalog; the
    /// other kinds use the sheet named after the kind, if any.
    pub fn new_character(
        &self,
        name: &str,
        kind: Kind,
        class: Option<&str>,
    ) -> Result<Character, EngineError> {
        let catalog = self.catalog();
        let sheet = match kind {
            Kind::Human => {
                let class = class.unwrap_or_default();
                let sheet = catalog
                    .sheet(class)
                    .filter(|s| s.kind == Kind::Human)
                    .ok_or_else(|| EngineError::UnknownClass(class.to_string()))?;
                Some(sheet)
            }
            _ => catalog.sheet(kind.name()),
        };
        let profile = catalog.kind_profile(kind);

        let mut pc = Character::new(name, kind);
        pc.reset_condition(profile.stress_limit);
        pc.attributes = catalog.attributes(profile.action_limit);
        pc.xp_triggers = catalog
            .xp_triggers(sheet.map_or(kind.name(), |s| s.name.as_str()))
            .all();

        if let Some(sheet) = sheet {
            pc.abilities.push(sheet.peculiar_ability.clone());
            for (action, dots) in &sheet.starting_dots {
                pc.action_dots(action, i32::from(*dots));
            }
            if let Variant::Human { class, .. } = &mut pc.variant {
                *class = sheet.name.clone();
            }
        }

        log::debug!("created {} {}", kind.name(), pc.name);
        Ok(pc)
    }

    /// A fresh crew of a catalog crew type, with its starting upgrades and
    /// cohorts.
    pub fn new_crew(&self, name: &str, crew_type: &str) -> Result<Crew, EngineError> {
        let template = self
            .catalog()
            .crew_sheet(crew_type)
            .ok_or_else(|| EngineError::UnknownCrewType(crew_type.to_string()))?;

        let mut crew = Crew::new(name, template.name.clone());
        for upgrade in &template.starting_upgrades {
            crew.add_upgrade(upgrade);
        }
        for cohort in &template.starting_cohorts {
            let cohort = if cohort.expert {
                Cohort::expert(cohort.kinds.join(", "), crew.tier())
            } else {
                Cohort::gang(cohort.kinds.iter().cloned(), crew.tier())
            };
            crew.add_cohort(cohort);
        }
        crew.xp_triggers = self.catalog().crew_xp_triggers(&template.name).all();
        Ok(crew)
    }

    pub fn migrate(&self, pc: Character, to: Kind) -> Result<Character, EngineError> {
        migration::migrate(pc, to, self.catalog())
    }

    pub fn change_class(&self, pc: &mut Character, class: &str) -> Result<(), EngineError> {
        migration::change_class(pc, class, self.catalog())
    }

    /// Roll an action at its rating plus any bonus dice. A desperate roll
    /// marks one experience on the attribute holding the action.
    pub fn action_roll(
        &mut self,
        pc: &mut Character,
        action: &str,
        position: Position,
        bonus_dice: u8,
    ) -> Result<ActionRoll, EngineError> {
        let rating = pc
            .action_rating(action)
            .ok_or_else(|| EngineError::UnknownAction(action.to_string()))?;
        let pool = DicePool::roll(rating.saturating_add(bonus_dice), &mut self.next_rng());
        let outcome = pool.outcome();

        let mut exp_marked = None;
        if position.marks_exp() {
            if let Some(attribute) = pc.attribute_of(action).map(|a| a.name.clone()) {
                pc.add_attribute_exp(&attribute, 1);
                exp_marked = Some(attribute);
            }
        }
        Ok(ActionRoll {
            pool,
            outcome,
            exp_marked,
        })
    }

    /// Resist a consequence with an attribute, paying the stress it costs.
    pub fn resistance_roll(
        &mut self,
        pc: &mut Character,
        attribute: &str,
    ) -> Result<ResistanceRoll, EngineError> {
        let level = pc
            .attribute(attribute)
            .map(|a| a.level())
            .ok_or_else(|| EngineError::UnknownAttribute(attribute.to_string()))?;
        let pool = DicePool::roll(level, &mut self.next_rng());
        let stress = pool.resistance_cost();

        let mut traumas = 0;
        if stress > 0 {
            traumas = pc.add_stress(stress.unsigned_abs());
        } else if stress < 0 {
            pc.clear_stress(stress.unsigned_abs());
        }
        Ok(ResistanceRoll {
            pool,
            stress,
            traumas,
        })
    }

    /// A roll not tied to a sheet: a fortune roll, engagement, etc.
    pub fn fortune_roll(&mut self, dice: u8) -> DicePool {
        DicePool::roll(dice, &mut self.next_rng())
    }

    fn next_rng(&mut self) -> StdRng {
        let rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.roll_count));
        self.roll_count += 1;
        rng
    }
}

impl RulesEngineBuilder {
    /// Directory of `.ron` rules files, merged over any provided rules.
    pub fn rules_dir(mut self, path: &str) -> Self {
        self.rules_dir = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide rules directly (for testing without files).
    pub fn with_rules(mut self, rules: RulesBook) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Use another catalog implementation. Takes precedence over rules
    /// files and `with_rules`.
    pub fn with_catalog(mut self, catalog: Box<dyn RulesCatalog + Send + Sync>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<RulesEngine, EngineError> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => {
                let mut rules = self.rules.unwrap_or_default();
                if let Some(ref dir) = self.rules_dir {
                    if Path::new(dir).exists() {
                        rules.merge(RulesBook::load_dir(Path::new(dir))?);
                    } else {
                        log::warn!("rules directory {} does not exist", dir);
                    }
                }
                Box::new(rules)
            }
        };

        Ok(RulesEngine {
            catalog,
            seed: self.seed,
            roll_count: 0,
        })
    }
}
