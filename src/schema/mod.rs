pub mod action;
pub mod character;
pub mod cohort;
pub mod gear;
pub mod harm;
pub mod link;
pub mod npc;
pub mod organization;
pub mod progress;
pub mod score;
