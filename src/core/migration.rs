/// Kind-changing operations on a character sheet: migrating between
/// human, vampire, ghost and hull, and switching a human's class.
use crate::core::catalog::RulesCatalog;
use crate::core::engine::EngineError;
use crate::schema::character::{Character, Kind, Variant};
use crate::schema::gear::SpecialAbility;

/// Turn `pc` into a character of kind `to`.
///
/// Cosmetic fields, attributes and the playbook carry over. The body's
/// condition (stress, traumas, items, harms, armor, load) starts fresh with
/// the destination's stress limit. Abilities are filtered through the
/// destination profile and its peculiar ability is placed first.
pub fn migrate(
    pc: Character,
    to: Kind,
    catalog: &dyn RulesCatalog,
) -> Result<Character, EngineError> {
    let from = pc.kind();
    if from == to {
        return Err(EngineError::MigrationUnsupported { from, to });
    }

    let profile = catalog.kind_profile(to);
    let sheet = catalog.sheet(to.name());

    let mut next = pc;
    next.variant = Variant::for_kind(to);
    next.reset_condition(profile.stress_limit);

    let mut abilities: Vec<SpecialAbility> = Vec::new();
    if let Some(sheet) = sheet {
        abilities.push(sheet.peculiar_ability.clone());
    }
    for ability in next.abilities.drain(..) {
        if profile.keeps(&ability) && !abilities.iter().any(|a| a.is_named(&ability.name)) {
            abilities.push(ability);
        }
    }
    next.abilities = abilities;

    next.xp_triggers = catalog.xp_triggers(to.name()).all();

    for attribute in &mut next.attributes {
        attribute.set_action_limit(profile.action_limit);
    }
    if let Some(sheet) = sheet {
        for (action, dots) in &sheet.starting_dots {
            if next.action_dots(action, i32::from(*dots)).is_none() {
                log::debug!("{} has no action '{}' for starting dots", next.name, action);
            }
        }
    }

    log::debug!("{} migrated from {} to {}", next.name, from.name(), to.name());
    Ok(next)
}

/// Switch a human's playbook class, swapping the peculiar ability and the
/// class xp triggers. Other kinds have no class to change.
pub fn change_class(
    pc: &mut Character,
    class: &str,
    catalog: &dyn RulesCatalog,
) -> Result<(), EngineError> {
    let kind = pc.kind();
    let Variant::Human { class: current, .. } = &mut pc.variant else {
        return Err(EngineError::ClassChangeUnsupported(kind));
    };
    let sheet = catalog
        .sheet(class)
        .filter(|s| s.kind == Kind::Human)
        .ok_or_else(|| EngineError::UnknownClass(class.to_string()))?;

    let previous = catalog
        .sheet(current.as_str())
        .map(|s| s.peculiar_ability.name.clone());
    *current = sheet.name.clone();

    if let Some(previous) = previous {
        pc.abilities.retain(|a| !a.is_named(&previous));
    }
    if !pc.has_ability(&sheet.peculiar_ability.name) {
        pc.abilities.insert(0, sheet.peculiar_ability.clone());
    }
    pc.xp_triggers = catalog.xp_triggers(&sheet.name).all();

    log::debug!("{} is now a {}", pc.name, sheet.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::RulesBook;
    use crate::schema::character::LoadLevel;
    use crate::schema::gear::Item;

    const BOOK: &str = r#"(
        attributes: [
            (name: "Insight", actions: ["Hunt", "Study", "Survey", "Tinker"]),
            (name: "Prowess", actions: ["Finesse", "Prowl", "Skirmish", "Wreck"]),
            (name: "Resolve", actions: ["Attune", "Command", "Consort", "Sway"]),
        ],
        general_xp_triggers: ["You struggled with issues from your vice or traumas."],
        kinds: [
            (kind: Ghost, stress_limit: 9, action_limit: 4, ability_keyword: Some("ghost"), drop_abilities: ["Ghost Form"]),
            (kind: Vampire, stress_limit: 12, action_limit: 5, ability_keyword: Some("ghost"), drop_abilities: ["Ghost Form"]),
        ],
        sheets: [
            (name: "Cutter", kind: Human, peculiar_ability: (name: "Battleborn"), xp_triggers: ["Violence."]),
            (name: "Whisper", kind: Human, peculiar_ability: (name: "Compel"), xp_triggers: ["Arcane power."]),
            (name: "Ghost", kind: Ghost, peculiar_ability: (name: "Ghost Form"), starting_dots: {"Attune": 1}, xp_triggers: ["Need."]),
            (name: "Vampire", kind: Vampire, peculiar_ability: (name: "Undead"), starting_dots: {"Attune": 1, "Command": 1}),
        ],
    )"#;

    fn cutter(book: &RulesBook) -> Character {
        let mut pc = Character::new("Vey", Kind::Human);
        pc.attributes = book.attributes(4);
        pc.variant = Variant::Human {
            owner: Default::default(),
            class: "Cutter".to_string(),
        };
        pc.abilities = vec![
            SpecialAbility::new("Battleborn", ""),
            SpecialAbility::new("Ghost Fighter", ""),
        ];
        pc.alias = "The Knife".to_string();
        pc
    }

    #[test]
    fn migrate_to_ghost() {
        let book = RulesBook::parse_ron(BOOK).unwrap();
        let mut pc = cutter(&book);
        pc.action_dots("Skirmish", 3);
        pc.add_exp(5);
        pc.add_stress(4);
        pc.add_trauma("Cold");
        pc.set_load(LoadLevel::Normal);
        pc.use_item(Item::new("Blade", 1));
        pc.add_harm(2, "Broken arm");

        let ghost = migrate(pc, Kind::Ghost, &book).unwrap();
        assert_eq!(ghost.kind(), Kind::Ghost);
        assert_eq!(ghost.alias, "The Knife");
        assert_eq!(ghost.playbook.exp, 5);
        assert_eq!(ghost.action_rating("Skirmish"), Some(3));
        assert_eq!(ghost.action_rating("Attune"), Some(1));
        assert_eq!(ghost.stress.level, 0);
        assert!(ghost.traumas.is_empty());
        assert!(ghost.items.is_empty());
        assert!(ghost.harms.is_empty());
        assert_eq!(ghost.load, 0);
        let names: Vec<&str> = ghost.abilities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Ghost Form", "Ghost Fighter"]);
        assert_eq!(ghost.xp_triggers.len(), 2);
        assert_eq!(ghost.vice().unwrap().name, "Need");
    }

    #[test]
    fn ghost_to_vampire_raises_limits() {
        let book = RulesBook::parse_ron(BOOK).unwrap();
        let ghost = migrate(cutter(&book), Kind::Ghost, &book).unwrap();
        let mut vampire = migrate(ghost, Kind::Vampire, &book).unwrap();
        assert_eq!(vampire.stress.limit, 12);
        assert_eq!(vampire.abilities[0].name, "Undead");
        assert!(!vampire.has_ability("Ghost Form"));
        assert!(vampire.has_ability("Ghost Fighter"));
        assert_eq!(vampire.action_dots("Skirmish", 5), Some(true));
        assert_eq!(vampire.action_rating("Skirmish"), Some(5));
        assert!(vampire.owner().is_some());
    }

    #[test]
    fn same_kind_is_rejected() {
        let book = RulesBook::parse_ron(BOOK).unwrap();
        let err = migrate(cutter(&book), Kind::Human, &book).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MigrationUnsupported { from: Kind::Human, to: Kind::Human }
        ));
    }

    #[test]
    fn change_class_swaps_peculiar() {
        let book = RulesBook::parse_ron(BOOK).unwrap();
        let mut pc = cutter(&book);
        change_class(&mut pc, "whisper", &book).unwrap();
        assert_eq!(pc.class(), Some("Whisper"));
        assert_eq!(pc.abilities[0].name, "Compel");
        assert!(!pc.has_ability("Battleborn"));
        assert!(pc.has_ability("Ghost Fighter"));
        assert_eq!(pc.xp_triggers[0], "Arcane power.");
    }

    #[test]
    fn change_class_validates() {
        let book = RulesBook::parse_ron(BOOK).unwrap();
        let mut pc = cutter(&book);
        assert!(matches!(
            change_class(&mut pc, "Ghost", &book),
            Err(EngineError::UnknownClass(_))
        ));
        assert_eq!(pc.class(), Some("Cutter"));

        let mut ghost = migrate(pc, Kind::Ghost, &book).unwrap();
        assert!(matches!(
            change_class(&mut ghost, "Whisper", &book),
            Err(EngineError::ClassChangeUnsupported(Kind::Ghost))
        ));
    }
}
