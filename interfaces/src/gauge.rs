extern crate alloc;

use alloy_sol_types::sol;
use stylus_sdk::stylus_proc::sol_interface;

sol! {
    event RewardDeposited(address indexed from, address token, uint256 amount, uint256 epoch);
    event RewardForwarded(address token, address to, uint256 amount);
}

// The gauge pulls `amount` of `token` from the caller, who approves it first.
sol_interface! {
    interface IRewardGauge {
        function depositRewardToken(address token, uint256 amount, uint256 epoch) external;

        function recoverToken() external returns (bool);
    }
}
