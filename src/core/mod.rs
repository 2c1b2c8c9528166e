pub mod catalog;
pub mod engine;
pub mod game;
pub mod migration;
pub mod roll;
pub mod snapshot;
