//! A single six-sided die with a hold flag.

use rand::Rng;
use thiserror::Error;

/// Number of dice in play.
pub const NUM_DICE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DieError {
    #[error("die value out of range 1..=6: {value}")]
    OutOfRange { value: u8 },
}

/// One die. `value` is always in 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Die {
    value: u8,
    held: bool,
}

impl Die {
    /// Placeholder face for dice that are about to be thrown.
    pub(crate) const BLANK: Die = Die {
        value: 1,
        held: false,
    };

    /// A freshly thrown, unheld die.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            value: rng.gen_range(1..=6),
            held: false,
        }
    }

    /// An unheld die showing `value`.
    pub fn with_value(value: u8) -> Result<Self, DieError> {
        check_value(value)?;
        Ok(Self { value, held: false })
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Re-roll unless held.
    pub fn roll<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.held {
            self.value = rng.gen_range(1..=6);
        }
    }

    /// Like [`Die::roll`], but with an externally drawn value.
    ///
    /// # Panics
    /// Panics if `value` is outside 1..=6.
    pub fn land(&mut self, value: u8) {
        assert!((1..=6).contains(&value), "die value out of range: {}", value);
        if !self.held {
            self.value = value;
        }
    }

    pub fn toggle_held(&mut self) {
        self.held = !self.held;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub(crate) fn set_held(&mut self, held: bool) {
        self.held = held;
    }
}

pub(crate) fn check_value(value: u8) -> Result<(), DieError> {
    if (1..=6).contains(&value) {
        Ok(())
    } else {
        Err(DieError::OutOfRange { value })
    }
}

/// Check that every value of a hand is a legal die face.
pub fn validate_dice(dice: &[u8; NUM_DICE]) -> Result<(), DieError> {
    dice.iter().try_for_each(|&v| check_value(v))
}

/// Current face values of a set of dice, in position order.
pub fn values(dice: &[Die; NUM_DICE]) -> [u8; NUM_DICE] {
    dice.map(|d| d.value)
}
