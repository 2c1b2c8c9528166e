//! Blades Engine: character and crew progression rules for Blades in the
//! Dark style games.
//!
//! Holds the rules state of a campaign: characters and their stress, harm,
//! load and advancement; the crew's tier, hold, heat and coin; factions,
//! NPCs, clocks and scores. Reference data comes from RON rules files, and
//! games persist as flat JSON records with named cross-references.

pub mod core;
pub mod schema;
