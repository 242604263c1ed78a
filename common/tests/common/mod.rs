#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use gauge_common::{
    clock::ManualClock,
    guards::Guards,
    ledger::MemoryLedger,
    router::RewardRouter,
    schedule::{Bounty, EpochDistributor},
    service::RewardService,
};
use log::LevelFilter;

pub const START: u64 = 1_700_000_000;

pub type Service = RewardService<MemoryLedger, ManualClock>;

pub fn configure_logs(level: LevelFilter) {
    let res = simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("gauge_common", level)
        .without_timestamps()
        .init();

    if res.is_err() {
        log::debug!("logger already initialized");
    }
}

pub fn e18(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18))
}

pub struct Actors {
    pub alice: Address,
    pub bob: Address,
    pub charlie: Address,
    pub recovery: Address,
    pub router: Address,
    pub gauge: Address,
    pub reward_token: Address,
    pub bounty_token: Address,
}

pub fn actors() -> Actors {
    Actors {
        alice: Address::repeat_byte(0xa1),
        bob: Address::repeat_byte(0xb0),
        charlie: Address::repeat_byte(0xc4),
        recovery: Address::repeat_byte(0xd1),
        router: Address::repeat_byte(0xd0),
        gauge: Address::repeat_byte(0x9a),
        reward_token: Address::repeat_byte(0x70),
        bounty_token: Address::repeat_byte(0xcc),
    }
}

pub fn campaign_address(index: u8) -> Address {
    Address::repeat_byte(0xe0 + index)
}

/// Router funded with `router_funds` reward tokens whose guards are the two
/// operators plus `campaigns` campaign contracts.
pub fn deploy(campaigns: u8, router_funds: U256) -> Service {
    let acc = actors();

    let mut guards = vec![acc.bob, acc.charlie];
    guards.extend((0..campaigns).map(campaign_address));

    let router = RewardRouter::new(
        Guards::new(guards),
        acc.reward_token,
        vec![acc.gauge],
        acc.recovery,
    );

    let mut ledger = MemoryLedger::new();
    if router_funds > U256::ZERO {
        ledger
            .mint(acc.reward_token, acc.router, router_funds)
            .unwrap();
    }

    let mut service = RewardService::new(acc.router, router, ledger, ManualClock::new(START));
    service.register_gauge(acc.gauge, acc.recovery).unwrap();
    for index in 0..campaigns {
        service
            .register_campaign(
                campaign_address(index),
                EpochDistributor::new(
                    Guards::new([acc.bob, acc.charlie]),
                    Bounty::new(acc.bounty_token, e18(1)),
                ),
            )
            .unwrap();
    }

    service
}

/// Binds campaign `index` to the gauge and hands it `epochs`.
pub fn configure(service: &Service, index: u8, epochs: Vec<U256>, min_epoch_duration: U256) {
    let acc = actors();
    let campaign = campaign_address(index);

    service
        .setup(campaign, acc.bob, acc.router, acc.gauge, min_epoch_duration)
        .unwrap();
    service
        .set_reward_epochs(campaign, acc.charlie, epochs)
        .unwrap();
}

pub fn balance(service: &Service, token: Address, account: Address) -> U256 {
    use gauge_common::ledger::TokenLedger;

    service
        .with_ledger(|ledger| ledger.balance_of(token, account))
        .unwrap()
}
