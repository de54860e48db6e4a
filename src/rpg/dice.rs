//! Tabletop dice (`NdS+M`) used for gold rewards and the daily bonus.
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
    pub modifier: u32,
}

/// Outcome of one roll, keeping the individual dice for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    pub rolls: Vec<u32>,
    pub modifier: u32,
    pub total: u64,
}

impl DiceSpec {
    pub const fn new(count: u32, sides: u32, modifier: u32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// A spec that always yields `value`.
    pub const fn flat(value: u32) -> Self {
        Self::new(0, 0, value)
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let rolls: Vec<u32> = if self.sides == 0 {
            Vec::new()
        } else {
            (0..self.count).map(|_| rng.gen_range(1..=self.sides)).collect()
        };
        let total = rolls.iter().map(|r| *r as u64).sum::<u64>() + self.modifier as u64;
        DiceRoll {
            rolls,
            modifier: self.modifier,
            total,
        }
    }

    pub fn min_total(&self) -> u64 {
        if self.sides == 0 {
            return self.modifier as u64;
        }
        self.count as u64 + self.modifier as u64
    }

    pub fn max_total(&self) -> u64 {
        self.count as u64 * self.sides as u64 + self.modifier as u64
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid dice notation: {0}")]
pub struct DiceParseError(String);

impl FromStr for DiceSpec {
    type Err = DiceParseError;

    /// Accepts `NdS`, `NdS+M` and a bare `M`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim().to_ascii_lowercase();
        let bad = || DiceParseError(text.clone());
        let number = |part: &str| part.trim().parse::<u32>().map_err(|_| bad());

        let Some((count, rest)) = text.split_once('d') else {
            return Ok(Self::flat(number(&text)?));
        };
        let (sides, modifier) = match rest.split_once('+') {
            Some((sides, modifier)) => (number(sides)?, number(modifier)?),
            None => (number(rest)?, 0),
        };
        let count = if count.trim().is_empty() { 1 } else { number(count)? };
        if sides == 0 {
            return Err(bad());
        }
        Ok(Self::new(count, sides, modifier))
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 || self.sides == 0 {
            return write!(f, "{}", self.modifier);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        }
        Ok(())
    }
}
