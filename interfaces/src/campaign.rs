extern crate alloc;

use alloy_sol_types::sol;

sol! {
    event SetupCompleted(address reward_manager, address receiving_reward_manager, uint256 min_epoch_duration);
    event RewardEpochsSet(uint256 epochs);
    event RewardDistributed(address receiving_reward_manager, uint256 amount, uint256 remaining_epochs);
    event ExecuteRewardPaid(address indexed executor, address token, uint256 amount);
}
