/// Rules Linter: checks a rules data directory for broken references and
/// gaps before a game loads it.
///
/// Usage: rules_linter <rules_dir_or_file>

use blades_engine::core::catalog::{RulesBook, RulesCatalog};
use blades_engine::schema::character::Kind;
use blades_engine::schema::gear::UNLIMITED_USES;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;

const KINDS: [Kind; 4] = [Kind::Human, Kind::Vampire, Kind::Ghost, Kind::Hull];

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: rules_linter <rules_dir_or_file>");
        process::exit(0);
    }

    let rules_path = Path::new(&args[1]);
    let loaded = if rules_path.is_file() {
        RulesBook::load_from_ron(rules_path)
    } else if rules_path.is_dir() {
        RulesBook::load_dir(rules_path)
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    };

    let book = match loaded {
        Ok(book) => book,
        Err(e) => {
            eprintln!("ERROR: Failed to load rules: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} sheets, {} crew types, {} items, {} claims, {} upgrades",
        book.sheets.len(),
        book.crews.len(),
        book.items.len(),
        book.claims.len(),
        book.upgrades.len()
    );

    let (errors, warnings) = lint_rules(&book);

    println!("\n=== Rules Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_rules(book: &RulesBook) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Attribute template
    if book.attributes.is_empty() {
        errors.push("No attributes defined".to_string());
    }
    let mut actions = FxHashSet::default();
    for attribute in &book.attributes {
        if attribute.actions.is_empty() {
            warnings.push(format!("Attribute '{}' has no actions", attribute.name));
        }
        for action in &attribute.actions {
            if !actions.insert(action.to_lowercase()) {
                errors.push(format!(
                    "Action '{}' appears more than once in the attribute template",
                    action
                ));
            }
        }
    }

    // Kinds
    for kind in KINDS {
        if !book.kinds.contains_key(&kind) {
            warnings.push(format!(
                "No profile for kind '{}' (built-in defaults apply)",
                kind.name()
            ));
        }
        if kind != Kind::Human && book.sheet(kind.name()).is_none() {
            warnings.push(format!(
                "No sheet for kind '{}'; migrations into it get no peculiar ability",
                kind.name()
            ));
        }
    }
    for profile in book.kinds.values() {
        if profile.stress_limit == 0 {
            errors.push(format!("Kind '{}' has a stress limit of 0", profile.kind.name()));
        }
    }

    // Sheets
    if book.classes().is_empty() {
        errors.push("No human classes defined".to_string());
    }
    for sheet in book.sheets.values() {
        let limit = book.kind_profile(sheet.kind).action_limit;
        for (action, dots) in &sheet.starting_dots {
            if !actions.contains(&action.to_lowercase()) {
                errors.push(format!(
                    "Sheet '{}' gives starting dots to unknown action '{}'",
                    sheet.name, action
                ));
            }
            if *dots > limit {
                errors.push(format!(
                    "Sheet '{}' gives {} dots in '{}' over the limit of {}",
                    sheet.name, dots, action, limit
                ));
            }
        }
        if sheet.xp_triggers.is_empty() {
            warnings.push(format!("Sheet '{}' has no xp triggers", sheet.name));
        }
    }

    // Crew types
    for crew in book.crews.values() {
        for upgrade in &crew.starting_upgrades {
            if !book.upgrades.iter().any(|u| u.name.eq_ignore_ascii_case(upgrade)) {
                warnings.push(format!(
                    "Crew type '{}' starts with upgrade '{}' which is not in the upgrade catalog",
                    crew.name, upgrade
                ));
            }
        }
        if crew.starting_cohorts.is_empty() {
            warnings.push(format!("Crew type '{}' has no starting cohort", crew.name));
        }
        if crew.starting_cohorts.iter().any(|c| c.kinds.is_empty()) {
            errors.push(format!("Crew type '{}' has a cohort with no type", crew.name));
        }
    }

    // Catalogs
    for item in &book.items {
        if item.usages < UNLIMITED_USES {
            errors.push(format!("Item '{}' has usages {}", item.name, item.usages));
        }
    }
    if book.general_xp_triggers.is_empty() {
        warnings.push("No general xp triggers".to_string());
    }

    (errors, warnings)
}
