/// Heist example: a crew's first score, from sheets to a saved game.
///
/// A mini campaign: build the crew → plan a score on a rival → roll the
/// action → take harm and stress → pay out rep and heat → one of the crew
/// dies and comes back as a ghost → save and reload.
///
/// Run with: cargo run --example heist

use blades_engine::core::engine::RulesEngine;
use blades_engine::core::game::{Game, GameId};
use blades_engine::core::roll::Position;
use blades_engine::schema::character::{Kind, LoadLevel};
use blades_engine::schema::gear::{Claim, Item};
use blades_engine::schema::npc::Npc;
use blades_engine::schema::organization::Faction;
use blades_engine::schema::progress::Clock;
use blades_engine::schema::score::Score;

fn main() {
    let mut engine = RulesEngine::builder()
        .rules_dir("rules_data")
        .seed(2026)
        .build()
        .expect("Failed to build engine");

    let mut game = Game::new(GameId(1), "Doskvol, Winter");

    // --- The world ---
    let sashes = game.add_faction(Faction::new("Red Sashes", 2));
    game.add_faction(Faction::new("Lampblacks", 2));
    game.add_npc(Npc::new("Mylera Klev", "Red Sashes leader").in_faction(game.faction_link("Red Sashes")));
    game.add_npc(Npc::new("Flint", "Spirit trafficker"));

    // --- The crew ---
    let mut crew = engine
        .new_crew("The Grey Cloaks", "Shadows")
        .expect("Failed to create crew");
    crew.contact = Some(game.npc_link("Flint"));
    crew.add_lair_claim(Claim::new("Lair"));
    game.crew = Some(crew);

    let mut vey = engine
        .new_character("Vey", Kind::Human, Some("Cutter"))
        .expect("Failed to create Vey");
    vey.set_load(LoadLevel::Normal);
    if let Some(owner) = vey.owner_mut() {
        owner.enemy = Some(game.npc_link("Mylera Klev"));
    }
    let arlo = engine
        .new_character("Arlo", Kind::Human, Some("Lurk"))
        .expect("Failed to create Arlo");
    game.add_character(vey);
    game.add_character(arlo);

    println!("=== {} ===\n", game.title);
    for pc in &game.characters {
        println!(
            "{} the {}: {}",
            pc.name,
            pc.class().unwrap_or("?"),
            pc.abilities
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    // --- The score ---
    game.add_score(Score::new("Burn the Sashes' school"));
    let tier = game
        .set_score_target("Burn the Sashes' school", "Mylera Klev")
        .unwrap_or_default();
    println!("\nTarget tier: {}", tier);
    game.add_clock(Clock::new("Sashes alerted", 4));

    let vey = game.character_mut("Vey").expect("Vey is in the game");
    for item in [Item::new("A Blade or Two", 1), Item::new("Armor", 2)] {
        let name = item.name.clone();
        println!("Vey takes {}: {}", name, vey.use_item(item));
    }

    let roll = engine
        .action_roll(vey, "Skirmish", Position::Desperate, 1)
        .expect("Skirmish is an action");
    println!("\nVey skirmishes, rolls {:?}: {:?}", roll.pool.dice, roll.outcome);
    if let Some(attribute) = &roll.exp_marked {
        println!("  desperate roll marks {} exp", attribute);
    }

    let placement = vey.add_harm(2, "Deep cut");
    println!("Vey suffers harm at level {}", placement.level());
    let resisted = engine
        .resistance_roll(vey, "Prowess")
        .expect("Prowess is an attribute");
    println!(
        "Vey resists for {} stress (now {}/{})",
        resisted.stress, vey.stress.level, vey.stress.limit
    );
    if game.tick_clock("Sashes alerted", 2) == Some(true) {
        println!("The Sashes are alerted!");
    }

    // --- Payoff ---
    let score_tier = game.score("Burn the Sashes' school").map_or(1, |s| s.target_tier);
    if let Some(crew) = game.crew.as_mut() {
        let rep = crew.calc_rep(score_tier).max(0) as u32;
        if let Some(cost) = crew.add_rep(rep) {
            println!("Tier up available for {} coin", cost);
        }
        let wanted = crew.add_heat(6);
        crew.add_coin(2);
        println!(
            "\nCrew: rep {}/{}, heat {}, wanted {} (+{}), coin {}",
            crew.rep,
            crew.rep_threshold(),
            crew.heat,
            crew.wanted_level,
            wanted,
            crew.coins
        );
    }
    if let Some(faction) = game.faction_mut(sashes) {
        if let Some(message) = faction.add_status(-3) {
            println!("{}", message);
        }
    }
    game.refresh_scores();

    // --- Death and return ---
    let arlo = game.take_character("Arlo").expect("Arlo is in the game");
    let ghost = engine.migrate(arlo, Kind::Ghost).expect("Humans can become ghosts");
    println!(
        "\nArlo returns as a {}: {}",
        ghost.kind().name(),
        ghost.abilities[0].name
    );
    game.replace_character(ghost);
    game.write_journal("The Grey Cloaks burned the Red Sashes' school. Arlo did not walk away.");

    // --- Save and reload ---
    let record = game.to_record().expect("Failed to save game");
    let json = serde_json::to_string_pretty(&record).expect("Failed to encode game");
    println!("\nSaved {} bytes", json.len());

    let restored = Game::from_record(record).expect("Failed to restore game");
    println!("Restored game matches: {}", restored == game);
}
