use alloy_sol_types::{sol, SolError};

use crate::safe_math::MathError;

sol! {
    error AlreadyInitialized();
    error OnlyGuards();
    error AlreadyConfigured();
    error InvalidDuration();
    error InvalidScheduleLength();
    error SetupNotCompleted();
    error RewardEpochsNotSet();
    error NoRemainingEpochs();
    error MinimumIntervalNotMet();
    error InvalidAmount();
    error ReceiverNotAllowed();
    error InsufficientBalance();
    error ReentrantCall();
}

/// Failures of the epoch distributor. Only `MinimumIntervalNotMet` is
/// resolved by retrying later; everything else needs a different caller,
/// different arguments, or a new campaign.
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum CampaignError {
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("only reward guards can call this function")]
    OnlyGuards,
    #[error("Setup already completed")]
    AlreadyConfigured,
    #[error("epoch duration must be between 3 days and a year")]
    InvalidDuration,
    #[error("Must set between 1 and 52 epochs")]
    InvalidScheduleLength,
    #[error("Setup not completed")]
    SetupNotCompleted,
    #[error("Reward epochs not set")]
    RewardEpochsNotSet,
    #[error("No remaining reward epochs")]
    NoRemainingEpochs,
    #[error("Minimum time between distributions not met")]
    MinimumIntervalNotMet,
    #[error(transparent)]
    Math(#[from] MathError),
}

impl CampaignError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CampaignError::MinimumIntervalNotMet)
    }
}

impl From<CampaignError> for Vec<u8> {
    fn from(err: CampaignError) -> Vec<u8> {
        use CampaignError as E;
        match err {
            E::AlreadyInitialized => AlreadyInitialized {}.encode(),
            E::OnlyGuards => OnlyGuards {}.encode(),
            E::AlreadyConfigured => AlreadyConfigured {}.encode(),
            E::InvalidDuration => InvalidDuration {}.encode(),
            E::InvalidScheduleLength => InvalidScheduleLength {}.encode(),
            E::SetupNotCompleted => SetupNotCompleted {}.encode(),
            E::RewardEpochsNotSet => RewardEpochsNotSet {}.encode(),
            E::NoRemainingEpochs => NoRemainingEpochs {}.encode(),
            E::MinimumIntervalNotMet => MinimumIntervalNotMet {}.encode(),
            E::Math(err) => err.into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum DistributorError {
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("only reward guards can call this function")]
    OnlyGuards,
    #[error("epoch duration must be between 3 days and a year")]
    InvalidDuration,
    #[error("amount must be greater than 0")]
    InvalidAmount,
    #[error("receiver is not an allowed gauge")]
    ReceiverNotAllowed,
    #[error("insufficient reward token balance")]
    InsufficientBalance,
}

impl From<DistributorError> for Vec<u8> {
    fn from(err: DistributorError) -> Vec<u8> {
        use DistributorError as E;
        match err {
            E::AlreadyInitialized => AlreadyInitialized {}.encode(),
            E::OnlyGuards => OnlyGuards {}.encode(),
            E::InvalidDuration => InvalidDuration {}.encode(),
            E::InvalidAmount => InvalidAmount {}.encode(),
            E::ReceiverNotAllowed => ReceiverNotAllowed {}.encode(),
            E::InsufficientBalance => InsufficientBalance {}.encode(),
        }
    }
}
