extern crate alloc;

use ruint::{aliases::U256, uint};

pub use safe_math::*;

pub mod campaigns;
pub mod clock;
pub mod errors;
pub mod guards;
#[cfg(feature = "stylus")]
pub mod host;
pub mod ledger;
pub mod plan;
pub mod router;
pub mod safe_math;
pub mod schedule;
pub mod service;
pub mod storage;

pub const SECOND: U256 = uint!(1_U256);
pub const DAY: U256 = uint!(86400_U256);
pub const WEEK: U256 = uint!(604800_U256);
pub const YEAR: U256 = uint!(31536000_U256);

pub const MIN_EPOCH_DURATION: U256 = uint!(259200_U256); // 3 days
pub const MAX_EPOCH_DURATION: U256 = YEAR;
pub const DEFAULT_EPOCH_DURATION: U256 = WEEK;

pub const MIN_REWARD_EPOCHS: usize = 1;
pub const MAX_REWARD_EPOCHS: usize = 52;

// early-release tolerance for keepers firing slightly ahead of schedule
pub const DISTRIBUTION_BUFFER: U256 = uint!(300_U256); // 5 minutes

/// Returns true when `duration` lies within `[MIN_EPOCH_DURATION, MAX_EPOCH_DURATION]`.
pub fn is_valid_epoch_duration(duration: U256) -> bool {
    (MIN_EPOCH_DURATION..=MAX_EPOCH_DURATION).contains(&duration)
}
