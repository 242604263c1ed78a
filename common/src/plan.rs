//! Rollout planning for batches of campaigns.
//!
//! Amounts are written by operators in whole-token units ("1071.42857") and
//! converted to base units before they are handed to `set_reward_epochs`.

use alloy_primitives::U256;

use crate::{
    errors::CampaignError, is_valid_epoch_duration, safe_add, safe_div, safe_mul, safe_sum,
    safe_math::MathError, DAY, MAX_REWARD_EPOCHS, MIN_REWARD_EPOCHS,
};

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum PlanError {
    #[error("invalid token amount {0:?}")]
    InvalidAmount(String),
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Schedule(#[from] CampaignError),
}

/// Converts a decimal amount into integer base units of a token with
/// `decimals` decimals. Fraction digits beyond `decimals` are truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, PlanError> {
    let invalid = || PlanError::InvalidAmount(amount.to_owned());

    let (whole, fraction) = match amount.trim().split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount.trim(), ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let digits = whole
        .bytes()
        .chain(
            fraction
                .bytes()
                .chain(std::iter::repeat(b'0'))
                .take(decimals as usize),
        )
        .collect::<Vec<_>>();

    if !fraction.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid());
    }

    digits.into_iter().try_fold(U256::ZERO, |value, byte| {
        if !byte.is_ascii_digit() {
            return Err(invalid());
        }

        let value = safe_mul(value, 10u64)?;
        Ok(safe_add(value, byte - b'0')?)
    })
}

/// Schedule for a single campaign, listed in the order it is handed to the
/// contract. Payout runs from the end of the list backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignPlan {
    pub epochs: Vec<U256>,
    pub min_epoch_duration: U256,
}

impl CampaignPlan {
    pub fn new(epochs: Vec<U256>, min_epoch_duration: U256) -> Self {
        Self {
            epochs,
            min_epoch_duration,
        }
    }

    /// A ramp of `growth` amounts followed by `steady_epochs` copies of
    /// `steady`.
    pub fn growth_then_steady(
        growth: &[U256],
        steady: U256,
        steady_epochs: usize,
        min_epoch_duration: U256,
    ) -> Self {
        let epochs = growth
            .iter()
            .copied()
            .chain(std::iter::repeat(steady).take(steady_epochs))
            .collect();

        Self::new(epochs, min_epoch_duration)
    }

    pub fn total(&self) -> Result<U256, MathError> {
        safe_sum(&self.epochs)
    }

    /// Shortest time in seconds the whole schedule takes to pay out.
    pub fn runtime(&self) -> Result<U256, MathError> {
        safe_mul(self.min_epoch_duration, self.epochs.len())
    }

    /// Amounts in the order the distributor will release them.
    pub fn payout_order(&self) -> impl Iterator<Item = U256> + '_ {
        self.epochs.iter().rev().copied()
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !(MIN_REWARD_EPOCHS..=MAX_REWARD_EPOCHS).contains(&self.epochs.len()) {
            return Err(CampaignError::InvalidScheduleLength.into());
        }

        if !is_valid_epoch_duration(self.min_epoch_duration) {
            return Err(CampaignError::InvalidDuration.into());
        }

        self.total()?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub epochs: usize,
    pub first: U256,
    pub last: U256,
    pub total: U256,
    pub runtime: U256,
    pub cumulative_total: U256,
    pub cumulative_events: usize,
}

impl PlanSummary {
    pub fn runtime_days(&self) -> U256 {
        self.runtime / DAY
    }

    /// Average base units released per day over the plan's runtime.
    pub fn daily_rate(&self) -> Result<U256, MathError> {
        safe_div(safe_mul(self.total, DAY)?, self.runtime)
    }
}

/// Running totals across every plan recorded during one rollout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolloutTally {
    total_rewards: U256,
    distribute_events: usize,
}

impl RolloutTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, plan: &CampaignPlan) -> Result<PlanSummary, PlanError> {
        plan.validate()?;

        let total = plan.total()?;
        let runtime = plan.runtime()?;
        let cumulative_total = safe_add(self.total_rewards, total)?;

        self.total_rewards = cumulative_total;
        self.distribute_events += plan.epochs.len();

        let summary = PlanSummary {
            epochs: plan.epochs.len(),
            first: plan.epochs[0],
            last: plan.epochs[plan.epochs.len() - 1],
            total,
            runtime,
            cumulative_total,
            cumulative_events: self.distribute_events,
        };

        for (i, amount) in plan.epochs.iter().enumerate() {
            log::debug!("  epoch {}: {amount}", i + 1);
        }
        log::info!(
            "{} epochs over {} days, first {} last {}, sum {}",
            summary.epochs,
            summary.runtime_days(),
            summary.first,
            summary.last,
            summary.total
        );
        log::info!(
            "allocated so far: {} in {} distribute events",
            summary.cumulative_total,
            summary.cumulative_events
        );

        Ok(summary)
    }

    pub fn total_rewards(&self) -> U256 {
        self.total_rewards
    }

    pub fn distribute_events(&self) -> usize {
        self.distribute_events
    }
}
