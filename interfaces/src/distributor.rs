extern crate alloc;

use alloy_sol_types::sol;
use stylus_sdk::stylus_proc::sol_interface;

sol! {
    event RewardSent(address indexed caller, address indexed receiver, uint256 amount, uint256 epoch);
    event CampaignAddressAdded(address campaign);
    event CampaignAddressRemoved(address campaign);
    event TokenRecovered(address token, address to, uint256 amount);
}

sol_interface! {
    interface IDistributor {
        function sendRewardToken(address receiver, uint256 amount) external;

        function sendRewardTokenWithEpoch(address receiver, uint256 amount, uint256 epoch) external;

        function depositSendRewardToken(address receiver, uint256 amount) external;

        function depositSendRewardTokenWithEpoch(address receiver, uint256 amount, uint256 epoch) external;

        function depositRewardTokenFromContract(address receiver, uint256 amount) external;

        function recoverToken(address token, uint256 amount) external;

        function removeCampaignAddress(address campaign) external;

        function getAllCampaignAddresses() external view returns (address[] memory);

        function rewardToken() external view returns (address);

        function recoveryAddress() external view returns (address);
    }
}
