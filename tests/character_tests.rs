/// Character integration tests: sheets built from the shipped rules data,
/// advancement bounds, harm and load.

use blades_engine::core::engine::RulesEngine;
use blades_engine::core::roll::Position;
use blades_engine::schema::action::Action;
use blades_engine::schema::character::{ArmorSlot, Character, Kind};
use blades_engine::schema::gear::Item;
use blades_engine::schema::harm::{HarmPlacement, HarmTrack, FATAL_HARM};
use blades_engine::schema::progress::Playbook;

fn engine() -> RulesEngine {
    RulesEngine::builder()
        .rules_dir("rules_data")
        .seed(7)
        .build()
        .unwrap()
}

#[test]
fn action_dots_stay_in_bounds() {
    for start in 0..=4 {
        for dots in -6..=6 {
            let mut action = Action::new("Skirmish");
            action.rating = start;
            let wanted = i32::from(start) + dots;
            let applied = action.add_dots(dots);
            assert!(action.rating <= action.limit);
            assert_eq!(applied, (0..=4).contains(&wanted), "start {} dots {}", start, dots);
        }
    }
}

#[test]
fn playbook_exp_converts_to_points() {
    for start in 0..8 {
        for exp in 0..30 {
            let mut playbook = Playbook::default();
            playbook.exp = start;
            let gained = playbook.add_exp(exp as i32);
            assert!(playbook.exp < playbook.exp_limit);
            assert_eq!(gained, (start + exp) / 8);
            assert_eq!(playbook.points, gained);
        }
    }
}

#[test]
fn full_harm_track_is_fatal_and_unchanged() {
    let mut track = HarmTrack::new();
    for (level, text) in [(1, "a"), (1, "b"), (2, "c"), (2, "d"), (3, "e")] {
        track.insert(level, text);
    }
    let before = track.clone();
    for level in 0..=4 {
        let placement = track.insert(level, "more");
        assert_eq!(placement, HarmPlacement::Fatal);
        assert_eq!(placement.level(), FATAL_HARM);
        assert_eq!(track, before);
    }
}

#[test]
fn healing_full_track() {
    let mut track = HarmTrack::new();
    for (level, text) in [(1, "a"), (1, "b"), (2, "c"), (2, "d"), (3, "e")] {
        track.insert(level, text);
    }
    let mut once = track.clone();
    once.heal();
    assert_eq!(once.levels()[0], ["c", "d"]);
    assert_eq!(once.levels()[1], ["e"]);
    assert!(once.levels()[2].is_empty());

    for _ in 0..3 {
        track.heal();
    }
    assert!(track.is_empty());
}

#[test]
fn harm_escalates_through_levels() {
    let mut pc = Character::new("Vey", Kind::Human);
    assert_eq!(pc.add_harm(2, "Cut"), HarmPlacement::Placed(2));
    assert_eq!(pc.add_harm(2, "Bruised"), HarmPlacement::Placed(2));
    assert_eq!(pc.add_harm(2, "Broken leg"), HarmPlacement::Placed(3));
    assert_eq!(pc.add_harm(3, "Shot"), HarmPlacement::Fatal);
}

#[test]
fn stress_overflow_becomes_trauma() {
    let mut pc = Character::new("Vey", Kind::Human);
    pc.stress.level = 7;
    assert_eq!(pc.add_stress(5), 1);
    assert_eq!(pc.stress.level, 3);
}

#[test]
fn load_limits_what_is_carried() {
    let mut pc = Character::new("Vey", Kind::Human);
    pc.load = 4;
    assert!(pc.use_item(Item::new("Blade", 2)));
    assert!(pc.use_item(Item::new("Pistol", 2)));
    assert_eq!(pc.carried_load(), 4);
    assert!(!pc.use_item(Item::new("Rope", 1)));
    assert!(pc.use_item(Item::new("Lucky Coin", 0)));
    assert_eq!(pc.items.len(), 3);
}

#[test]
fn ghosts_carry_nothing() {
    let mut ghost = engine().new_character("Setarra", Kind::Ghost, None).unwrap();
    ghost.load = 6;
    assert!(!ghost.use_item(Item::new("Blade", 1)));
    assert!(ghost.owner().is_none());
    assert_eq!(ghost.vice().map(|v| v.name.as_str()), Some("Need"));
}

#[test]
fn every_class_builds() {
    let engine = engine();
    for class in ["Cutter", "Hound", "Leech", "Lurk", "Slide", "Spider", "Whisper"] {
        let pc = engine.new_character("Rogue", Kind::Human, Some(class)).unwrap();
        assert_eq!(pc.class(), Some(class));
        assert_eq!(pc.attributes.len(), 3);
        let dots: u32 = pc
            .attributes
            .iter()
            .flat_map(|a| &a.actions)
            .map(|a| u32::from(a.rating))
            .sum();
        assert_eq!(dots, 3, "{}", class);
        assert!(pc.xp_triggers.len() >= 3);
    }
}

#[test]
fn armor_boxes_once_per_reset() {
    let mut pc = Character::new("Vey", Kind::Human);
    assert!(pc.use_armor(ArmorSlot::Standard));
    assert!(!pc.use_armor(ArmorSlot::Standard));
    assert!(pc.use_armor(ArmorSlot::Heavy));
    pc.reset_armor();
    assert!(pc.use_armor(ArmorSlot::Standard));
}

#[test]
fn cutter_dies_and_returns_as_vampire() {
    let mut engine = engine();
    let mut pc = engine.new_character("Vey", Kind::Human, Some("Cutter")).unwrap();
    engine
        .action_roll(&mut pc, "Skirmish", Position::Desperate, 0)
        .unwrap();
    pc.add_trauma("Reckless");

    let ghost = engine.migrate(pc, Kind::Ghost).unwrap();
    assert_eq!(ghost.abilities[0].name, "Ghost Form");
    assert!(ghost.traumas.is_empty());
    assert_eq!(ghost.attribute("Prowess").unwrap().playbook.exp, 1);

    let vampire = engine.migrate(ghost, Kind::Vampire).unwrap();
    assert_eq!(vampire.abilities[0].name, "Undead");
    assert!(!vampire.has_ability("Ghost Form"));
    assert_eq!(vampire.stress.limit, 12);
    assert!(vampire
        .attributes
        .iter()
        .flat_map(|a| &a.actions)
        .all(|a| a.limit == 5));
    assert!(engine.change_class(&mut vampire.clone(), "Whisper").is_err());
}
