/// Reference data: attribute templates, playbook sheets, crew types and
/// the item/claim/upgrade catalogs, loaded from RON.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::schema::action::{Attribute, ACTION_LIMIT};
use crate::schema::character::{Kind, STRESS_LIMIT};
use crate::schema::gear::{Claim, Item, SpecialAbility};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// An attribute and the names of its actions, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTemplate {
    pub name: String,
    pub actions: Vec<String>,
}

/// Per-kind rules: stress boxes, action cap, and which abilities survive
/// a migration into this kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindProfile {
    pub kind: Kind,
    pub stress_limit: u32,
    pub action_limit: u8,
    /// Abilities whose name contains this (case-insensitive) are kept when
    /// migrating into the kind. `None` keeps nothing.
    #[serde(default)]
    pub ability_keyword: Option<String>,
    /// Abilities dropped even when they match the keyword.
    #[serde(default)]
    pub drop_abilities: Vec<String>,
}

impl KindProfile {
    /// Built-in profile used when the catalog has none for a kind.
    pub fn standard(kind: Kind) -> Self {
        let supernatural = !matches!(kind, Kind::Human);
        Self {
            kind,
            stress_limit: match kind {
                Kind::Vampire => 12,
                _ => STRESS_LIMIT,
            },
            action_limit: match kind {
                Kind::Vampire => 5,
                _ => ACTION_LIMIT,
            },
            ability_keyword: supernatural.then(|| "ghost".to_string()),
            drop_abilities: if supernatural {
                vec!["Ghost Form".to_string()]
            } else {
                Vec::new()
            },
        }
    }

    /// Whether an ability carries over into this kind.
    pub fn keeps(&self, ability: &SpecialAbility) -> bool {
        let Some(keyword) = &self.ability_keyword else {
            return false;
        };
        ability
            .name
            .to_lowercase()
            .contains(&keyword.to_lowercase())
            && !self.drop_abilities.iter().any(|d| ability.is_named(d))
    }
}

/// A character playbook: a human class (Cutter, Hound, ...) or the sheet
/// of a supernatural kind (Ghost, Vampire, Hull).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTemplate {
    pub name: String,
    pub kind: Kind,
    pub peculiar_ability: SpecialAbility,
    #[serde(default)]
    pub starting_dots: BTreeMap<String, u8>,
    #[serde(default)]
    pub xp_triggers: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<SpecialAbility>,
}

/// A starting cohort of a crew type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortTemplate {
    pub kinds: Vec<String>,
    #[serde(default)]
    pub expert: bool,
}

/// A crew type (Assassins, Bravos, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewTemplate {
    pub name: String,
    #[serde(default)]
    pub abilities: Vec<SpecialAbility>,
    #[serde(default)]
    pub starting_upgrades: Vec<String>,
    #[serde(default)]
    pub starting_cohorts: Vec<CohortTemplate>,
    #[serde(default)]
    pub xp_triggers: Vec<String>,
}

/// An entry of the crew upgrade catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeEntry {
    pub name: String,
    #[serde(default = "one")]
    pub cost: u8,
    #[serde(default)]
    pub description: String,
}

fn one() -> u8 {
    1
}

/// XP triggers for a sheet, split the way the sheet prints them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XpTriggers {
    pub peculiar: Vec<String>,
    pub general: Vec<String>,
}

impl XpTriggers {
    pub fn all(&self) -> Vec<String> {
        self.peculiar
            .iter()
            .chain(&self.general)
            .cloned()
            .collect()
    }
}

/// Read-only game-rules content. Lookups that find nothing mean "no rules
/// content for this request", not failure.
pub trait RulesCatalog {
    fn attribute_template(&self) -> &[AttributeTemplate];
    fn sheet(&self, name: &str) -> Option<&SheetTemplate>;
    fn kind_profile(&self, kind: Kind) -> KindProfile;
    fn general_xp_triggers(&self) -> &[String];
    fn crew_sheet(&self, crew_type: &str) -> Option<&CrewTemplate>;
    fn crew_general_xp_triggers(&self) -> &[String];
    fn items(&self) -> &[Item];
    fn claims(&self) -> &[Claim];
    fn upgrades(&self) -> &[UpgradeEntry];

    /// Whether `name` is a human playbook class.
    fn is_class(&self, name: &str) -> bool {
        self.sheet(name).is_some_and(|s| s.kind == Kind::Human)
    }

    fn xp_triggers(&self, sheet: &str) -> XpTriggers {
        XpTriggers {
            peculiar: self
                .sheet(sheet)
                .map(|s| s.xp_triggers.clone())
                .unwrap_or_default(),
            general: self.general_xp_triggers().to_vec(),
        }
    }

    fn crew_xp_triggers(&self, crew_type: &str) -> XpTriggers {
        XpTriggers {
            peculiar: self
                .crew_sheet(crew_type)
                .map(|c| c.xp_triggers.clone())
                .unwrap_or_default(),
            general: self.crew_general_xp_triggers().to_vec(),
        }
    }

    /// Fresh attributes built from the template, actions capped at `limit`.
    fn attributes(&self, limit: u8) -> Vec<Attribute> {
        self.attribute_template()
            .iter()
            .map(|t| {
                let mut attribute = Attribute::with_actions(t.name.clone(), t.actions.iter().cloned());
                attribute.set_action_limit(limit);
                attribute
            })
            .collect()
    }
}

// RON file layout. Every section is optional so content can be split
// across several files and merged.
#[derive(Debug, Default, Deserialize)]
struct RonRules {
    #[serde(default)]
    attributes: Vec<AttributeTemplate>,
    #[serde(default)]
    general_xp_triggers: Vec<String>,
    #[serde(default)]
    crew_general_xp_triggers: Vec<String>,
    #[serde(default)]
    kinds: Vec<KindProfile>,
    #[serde(default)]
    sheets: Vec<SheetTemplate>,
    #[serde(default)]
    crews: Vec<CrewTemplate>,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    claims: Vec<Claim>,
    #[serde(default)]
    upgrades: Vec<UpgradeEntry>,
}

/// The rules catalog backed by RON files.
#[derive(Debug, Clone, Default)]
pub struct RulesBook {
    pub attributes: Vec<AttributeTemplate>,
    pub general_xp_triggers: Vec<String>,
    pub crew_general_xp_triggers: Vec<String>,
    pub kinds: FxHashMap<Kind, KindProfile>,
    /// Sheets keyed by lowercase name.
    pub sheets: FxHashMap<String, SheetTemplate>,
    /// Crew types keyed by lowercase name.
    pub crews: FxHashMap<String, CrewTemplate>,
    pub items: Vec<Item>,
    pub claims: Vec<Claim>,
    pub upgrades: Vec<UpgradeEntry>,
}

impl RulesBook {
    /// Load a rules book from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<RulesBook, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a rules book from a RON string.
    pub fn parse_ron(input: &str) -> Result<RulesBook, CatalogError> {
        let raw: RonRules = ron::from_str(input)?;
        let mut book = RulesBook {
            attributes: raw.attributes,
            general_xp_triggers: raw.general_xp_triggers,
            crew_general_xp_triggers: raw.crew_general_xp_triggers,
            items: raw.items,
            claims: raw.claims,
            upgrades: raw.upgrades,
            ..RulesBook::default()
        };
        for profile in raw.kinds {
            book.kinds.insert(profile.kind, profile);
        }
        for sheet in raw.sheets {
            book.sheets.insert(sheet.name.to_lowercase(), sheet);
        }
        for crew in raw.crews {
            book.crews.insert(crew.name.to_lowercase(), crew);
        }
        Ok(book)
    }

    /// Load and merge every `.ron` file of a directory, in file-name order.
    pub fn load_dir(dir: &Path) -> Result<RulesBook, CatalogError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("ron"))
            .collect();
        paths.sort();

        let mut book = RulesBook::default();
        for path in paths {
            book.merge(Self::load_from_ron(&path)?);
            log::debug!("loaded rules from {}", path.display());
        }
        Ok(book)
    }

    /// Merge another book into this one. Named entries from `other`
    /// replace entries with the same name; lists are appended, and the
    /// attribute template is replaced when `other` defines one.
    pub fn merge(&mut self, other: RulesBook) {
        if !other.attributes.is_empty() {
            self.attributes = other.attributes;
        }
        self.general_xp_triggers.extend(other.general_xp_triggers);
        self.crew_general_xp_triggers
            .extend(other.crew_general_xp_triggers);
        self.kinds.extend(other.kinds);
        self.sheets.extend(other.sheets);
        self.crews.extend(other.crews);
        merge_named(&mut self.items, other.items, |i| &i.name);
        merge_named(&mut self.claims, other.claims, |c| &c.name);
        merge_named(&mut self.upgrades, other.upgrades, |u| &u.name);
    }

    /// Names of all human classes, sorted.
    pub fn classes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sheets
            .values()
            .filter(|s| s.kind == Kind::Human)
            .map(|s| s.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

fn merge_named<T>(into: &mut Vec<T>, from: Vec<T>, name: impl Fn(&T) -> &String) {
    for entry in from {
        match into
            .iter()
            .position(|existing| name(existing).eq_ignore_ascii_case(name(&entry)))
        {
            Some(index) => into[index] = entry,
            None => into.push(entry),
        }
    }
}

impl RulesCatalog for RulesBook {
    fn attribute_template(&self) -> &[AttributeTemplate] {
        &self.attributes
    }

    fn sheet(&self, name: &str) -> Option<&SheetTemplate> {
        self.sheets.get(&name.to_lowercase())
    }

    fn kind_profile(&self, kind: Kind) -> KindProfile {
        self.kinds
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| KindProfile::standard(kind))
    }

    fn general_xp_triggers(&self) -> &[String] {
        &self.general_xp_triggers
    }

    fn crew_sheet(&self, crew_type: &str) -> Option<&CrewTemplate> {
        self.crews.get(&crew_type.to_lowercase())
    }

    fn crew_general_xp_triggers(&self) -> &[String] {
        &self.crew_general_xp_triggers
    }

    fn items(&self) -> &[Item] {
        &self.items
    }

    fn claims(&self) -> &[Claim] {
        &self.claims
    }

    fn upgrades(&self) -> &[UpgradeEntry] {
        &self.upgrades
    }
}
