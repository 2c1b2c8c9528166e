use serde::{Deserialize, Serialize};

use super::progress::{Playbook, ATTRIBUTE_EXP_LIMIT};

/// Default maximum rating for an action.
pub const ACTION_LIMIT: u8 = 4;

/// A rated capability such as Hunt or Skirmish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default = "default_limit")]
    pub limit: u8,
}

fn default_limit() -> u8 {
    ACTION_LIMIT
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rating: 0,
            limit: ACTION_LIMIT,
        }
    }

    /// Add (or remove) dots. The rating is clamped to `0..=limit`; returns
    /// false when the full request could not be honoured.
    pub fn add_dots(&mut self, dots: i32) -> bool {
        let wanted = i64::from(self.rating) + i64::from(dots);
        let clamped = wanted.clamp(0, i64::from(self.limit));
        self.rating = clamped as u8;
        clamped == wanted
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A group of actions with its own experience track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub actions: Vec<Action>,
    #[serde(default = "attribute_playbook")]
    pub playbook: Playbook,
}

fn attribute_playbook() -> Playbook {
    Playbook::with_limit(ATTRIBUTE_EXP_LIMIT)
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            playbook: attribute_playbook(),
        }
    }

    /// Build an attribute from action names, skipping duplicates.
    pub fn with_actions<I, S>(name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut attribute = Self::new(name);
        for action in actions {
            attribute.add_action(Action::new(action));
        }
        attribute
    }

    /// Append an action unless one with the same name exists.
    pub fn add_action(&mut self, action: Action) -> bool {
        if self.action(&action.name).is_some() {
            return false;
        }
        self.actions.push(action);
        true
    }

    /// Number of actions with at least one dot. This is also the dice pool
    /// for resistance rolls.
    pub fn level(&self) -> u8 {
        self.actions.iter().filter(|a| a.rating > 0).count() as u8
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.is_named(name))
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.is_named(name))
    }

    pub fn action_rating(&self, name: &str) -> Option<u8> {
        self.action(name).map(|a| a.rating)
    }

    /// Add dots to a named action. `None` when the action isn't part of
    /// this attribute, otherwise the clamping result of `Action::add_dots`.
    pub fn action_dots(&mut self, name: &str, dots: i32) -> Option<bool> {
        self.action_mut(name).map(|a| a.add_dots(dots))
    }

    /// Change every action's cap, pulling ratings down if needed.
    pub fn set_action_limit(&mut self, limit: u8) {
        for action in &mut self.actions {
            action.limit = limit;
            action.rating = action.rating.min(limit);
        }
    }

    pub fn add_exp(&mut self, delta: i32) -> u32 {
        self.playbook.add_exp(delta)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// True when no two actions share a name (ignoring case).
    pub fn has_unique_actions(&self) -> bool {
        self.actions
            .iter()
            .enumerate()
            .all(|(i, a)| self.actions[..i].iter().all(|b| !b.is_named(&a.name)))
    }
}
