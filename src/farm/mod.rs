//! Stamina, money, seed catalog and farm plots

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Number of plots on a fresh farm
pub const DEFAULT_PLOTS: usize = 9;

/// Money a new player starts with
pub const STARTING_MONEY: u32 = 50;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FarmError {
    #[error("not enough stamina: need {needed}, have {available}")]
    NotEnoughStamina { needed: f64, available: f64 },
    #[error("not enough money: need ${needed}, have ${available}")]
    NotEnoughMoney { needed: u32, available: u32 },
    #[error("no free plot left")]
    NoFreePlot,
    #[error("unknown seed '{0}'")]
    UnknownSeed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub name: String,
    pub cost: u32,
    pub growth_time: u32,  // seconds
    pub value: u32,
    pub stamina_cost: f64,
}

impl Seed {
    fn new(name: &str, cost: u32, growth_time: u32, value: u32, stamina_cost: f64) -> Self {
        Self {
            name: name.to_string(),
            cost,
            growth_time,
            value,
            stamina_cost,
        }
    }

    /// Menu label, e.g. "Wheat ($10, 0.5♥)"
    pub fn label(&self) -> String {
        let mut chars = self.name.chars();
        let name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{} (${}, {}♥)", name, self.cost, self.stamina_cost)
    }
}

pub fn default_seeds() -> Vec<Seed> {
    vec![
        Seed::new("wheat", 10, 10, 20, 0.5),
        Seed::new("corn", 20, 20, 45, 0.5),
        Seed::new("pumpkin", 40, 40, 100, 1.0),
    ]
}

pub fn find_seed<'a>(seeds: &'a [Seed], name: &str) -> Result<&'a Seed, FarmError> {
    seeds
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| FarmError::UnknownSeed(name.to_string()))
}

/// Player stamina, shown as hearts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamina {
    pub current: f64,
    pub max: f64,
}

impl Stamina {
    pub fn new(current: f64, max: f64) -> Self {
        Self { current, max }
    }

    pub fn has(&self, amount: f64) -> bool {
        self.current >= amount
    }

    pub fn spend(&mut self, amount: f64) -> Result<(), FarmError> {
        if !self.has(amount) {
            return Err(FarmError::NotEnoughStamina {
                needed: amount,
                available: self.current,
            });
        }
        self.current -= amount;
        Ok(())
    }

    /// Raise stamina up to `max`. A value already above `max` is left alone.
    pub fn restore(&mut self, amount: f64) {
        if self.current >= self.max {
            return;
        }
        self.current = self.max.min(self.current + amount);
    }

    /// Lower stamina without the "has enough" check, floored at zero
    pub fn drain(&mut self, amount: f64) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn full_restore(&mut self) {
        self.current = self.max;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wallet {
    pub money: u32,
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(STARTING_MONEY)
    }
}

impl Wallet {
    pub fn new(money: u32) -> Self {
        Self { money }
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.money >= cost
    }

    pub fn spend(&mut self, cost: u32) -> Result<(), FarmError> {
        if !self.can_afford(cost) {
            return Err(FarmError::NotEnoughMoney {
                needed: cost,
                available: self.money,
            });
        }
        self.money -= cost;
        Ok(())
    }

    pub fn earn(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }
}

/// A crop growing in one plot
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub crop: String,
    pub value: u32,
    pub growth_time: Duration,
    pub planted_at: Instant,
}

impl Plot {
    pub fn new(seed: &Seed, now: Instant) -> Self {
        Self {
            crop: seed.name.clone(),
            value: seed.value,
            growth_time: Duration::from_secs(u64::from(seed.growth_time)),
            planted_at: now,
        }
    }

    /// Growth between 0 and 1
    pub fn progress(&self, now: Instant) -> f64 {
        if self.growth_time.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.planted_at);
        (elapsed.as_secs_f64() / self.growth_time.as_secs_f64()).min(1.0)
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Result of harvesting every ready plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Harvest {
    pub plots: usize,
    pub earned: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Farm {
    pub plots: Vec<Option<Plot>>,
}

impl Default for Farm {
    fn default() -> Self {
        Self::new(DEFAULT_PLOTS)
    }
}

impl Farm {
    pub fn new(size: usize) -> Self {
        Self { plots: vec![None; size] }
    }

    pub fn free_plots(&self) -> usize {
        self.plots.iter().filter(|p| p.is_none()).count()
    }

    pub fn ready_plots(&self, now: Instant) -> usize {
        self.plots
            .iter()
            .flatten()
            .filter(|p| p.is_ready(now))
            .count()
    }

    /// Plant into the first empty plot, returning its index
    pub fn plant(&mut self, seed: &Seed, now: Instant) -> Result<usize, FarmError> {
        let index = self
            .plots
            .iter()
            .position(Option::is_none)
            .ok_or(FarmError::NoFreePlot)?;
        self.plots[index] = Some(Plot::new(seed, now));
        Ok(index)
    }

    /// Clear every ready plot and add up what the crops are worth
    pub fn harvest_ready(&mut self, now: Instant) -> Harvest {
        let mut harvest = Harvest::default();
        for slot in self.plots.iter_mut() {
            if slot.as_ref().is_some_and(|p| p.is_ready(now)) {
                if let Some(plot) = slot.take() {
                    harvest.plots += 1;
                    harvest.earned = harvest.earned.saturating_add(plot.value);
                }
            }
        }
        harvest
    }
}
