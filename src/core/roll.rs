/// Dice math for action, resistance and fortune rolls.
use rand::rngs::StdRng;
use rand::Rng;

/// Result band of a roll, read from the kept dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollOutcome {
    /// Two or more sixes.
    Critical,
    /// A six.
    Success,
    /// Best die is a 4 or 5.
    Partial,
    /// Best die is 1 to 3.
    Failure,
}

/// How dangerous the action is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    Controlled,
    #[default]
    Risky,
    Desperate,
}

impl Position {
    /// Desperate rolls mark experience on the action's attribute.
    pub fn marks_exp(&self) -> bool {
        matches!(self, Position::Desperate)
    }
}

/// Dice thrown for one roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicePool {
    pub dice: Vec<u8>,
    /// True when the pool was empty and the lowest of two dice is kept.
    pub zero_dice: bool,
}

impl DicePool {
    /// Roll `dice` six-sided dice. With no dice, roll two and keep the lowest.
    pub fn roll(dice: u8, rng: &mut StdRng) -> Self {
        let count = if dice == 0 { 2 } else { dice };
        let thrown = (0..count).map(|_| rng.gen_range(1..=6)).collect();
        Self::from_dice(thrown, dice == 0)
    }

    pub fn from_dice(dice: Vec<u8>, zero_dice: bool) -> Self {
        Self { dice, zero_dice }
    }

    /// The die that decides the outcome.
    pub fn kept(&self) -> u8 {
        let dice = self.dice.iter().copied();
        let kept = if self.zero_dice { dice.min() } else { dice.max() };
        kept.unwrap_or(1)
    }

    pub fn outcome(&self) -> RollOutcome {
        let sixes = self.dice.iter().filter(|&&d| d == 6).count();
        if !self.zero_dice && sixes >= 2 {
            return RollOutcome::Critical;
        }
        match self.kept() {
            6 => RollOutcome::Success,
            4 | 5 => RollOutcome::Partial,
            _ => RollOutcome::Failure,
        }
    }

    /// Stress paid to resist a consequence. Negative on a critical: the
    /// character clears that much stress instead.
    pub fn resistance_cost(&self) -> i32 {
        match self.outcome() {
            RollOutcome::Critical => -1,
            _ => 6 - i32::from(self.kept()),
        }
    }
}
