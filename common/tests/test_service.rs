mod common;

use std::thread;

use alloy_primitives::U256;
use gauge_common::{
    errors::{CampaignError, DistributorError},
    ledger::{LedgerError, TokenLedger},
    plan::{CampaignPlan, RolloutTally},
    router::Funding,
    service::ServiceError,
    DAY, DISTRIBUTION_BUFFER, WEEK,
};
use log::LevelFilter;

use crate::common::{actors, balance, campaign_address, configure, configure_logs, deploy, e18};

#[test]
fn test_full_campaign_runs_to_exhaustion() {
    configure_logs(LevelFilter::Debug);
    let acc = actors();
    let min = DAY * U256::from(4);
    let service = deploy(1, e18(100));
    let campaign = campaign_address(0);
    configure(&service, 0, vec![e18(1), e18(2), e18(3)], min);

    let release = service.distribute(campaign).unwrap();
    assert_eq!(release.amount, e18(3));
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(3));
    assert_eq!(service.campaign_addresses().unwrap(), vec![campaign]);

    service.clock().advance(4 * 86_400);
    service.distribute(campaign).unwrap();
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(5));

    service.clock().advance(4 * 86_400);
    let release = service.distribute(campaign).unwrap();
    assert_eq!(release.remaining_epochs, 0);
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(6));
    assert_eq!(balance(&service, acc.reward_token, acc.router), e18(94));

    service.clock().advance(365 * 86_400);
    assert_eq!(
        service.distribute(campaign),
        Err(ServiceError::Campaign(CampaignError::NoRemainingEpochs))
    );
    assert_eq!(service.execution_allowed(campaign), Ok(false));
    assert_eq!(service.campaign_addresses().unwrap(), vec![campaign]);
}

#[test]
fn test_early_distribution_moves_nothing() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let min = DAY * U256::from(3);
    let service = deploy(1, e18(100));
    let campaign = campaign_address(0);
    configure(&service, 0, vec![e18(2), e18(1), e18(5)], min);

    service.distribute(campaign).unwrap();
    assert_eq!(
        service.next_epoch_info(campaign),
        Ok((e18(1), min - DISTRIBUTION_BUFFER))
    );

    service.clock().advance(3 * 86_400 - 1000);
    assert_eq!(
        service.distribute(campaign),
        Err(ServiceError::Campaign(CampaignError::MinimumIntervalNotMet))
    );
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(5));
    assert_eq!(
        service.campaign_snapshot(campaign).unwrap().remaining_epochs(),
        2
    );

    service.clock().advance(1000);
    assert_eq!(service.distribute(campaign).unwrap().amount, e18(1));
}

#[test]
fn test_execute_pays_bounty_from_campaign_balance() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(1, e18(100));
    let campaign = campaign_address(0);
    configure(&service, 0, vec![e18(4), e18(4)], WEEK);
    service
        .with_ledger(|ledger| ledger.mint(acc.bounty_token, campaign, e18(1)))
        .unwrap()
        .unwrap();

    let execution = service.execute(campaign, acc.alice).unwrap();
    assert_eq!(execution.release.amount, e18(4));
    assert_eq!(balance(&service, acc.bounty_token, acc.alice), e18(1));
    assert_eq!(balance(&service, acc.bounty_token, campaign), U256::ZERO);

    // bounty pool is empty now, distribution still goes through
    service.clock().advance(7 * 86_400);
    let execution = service.execute(campaign, acc.alice).unwrap();
    assert_eq!(execution.bounty, None);
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(8));
    assert_eq!(balance(&service, acc.bounty_token, acc.alice), e18(1));
}

#[test]
fn test_concurrent_callers_release_once_per_interval() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(1, e18(100));
    let campaign = campaign_address(0);
    configure(&service, 0, vec![e18(1); 4], WEEK);

    let service = &service;
    let results = thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| scope.spawn(move || service.distribute(campaign)))
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    for result in results.iter().filter(|result| result.is_err()) {
        assert_eq!(
            result,
            &Err(ServiceError::Campaign(CampaignError::MinimumIntervalNotMet))
        );
    }

    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(1));
    assert_eq!(
        service.campaign_snapshot(campaign).unwrap().remaining_epochs(),
        3
    );
}

#[test]
fn test_keeper_runs_only_due_campaigns() {
    configure_logs(LevelFilter::Debug);
    let acc = actors();
    let service = deploy(2, e18(100));
    configure(&service, 0, vec![e18(3), e18(2)], WEEK);

    let outcomes = service.run_due(acc.alice);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].campaign, campaign_address(0));
    assert_eq!(outcomes[0].result.as_ref().unwrap().release.amount, e18(2));

    assert!(service.run_due(acc.alice).is_empty());

    service.clock().advance(7 * 86_400 - 300);
    let outcomes = service.run_due(acc.alice);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(5));

    service.clock().advance(30 * 86_400);
    assert!(service.run_due(acc.alice).is_empty());
}

#[test]
fn test_unfunded_router_rolls_back_campaign() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(1, e18(1));
    let campaign = campaign_address(0);
    configure(&service, 0, vec![e18(1), e18(2)], WEEK);

    assert_eq!(
        service.distribute(campaign),
        Err(ServiceError::Ledger(LedgerError::InsufficientBalance {
            token: acc.reward_token,
            account: acc.router,
        }))
    );

    let snapshot = service.campaign_snapshot(campaign).unwrap();
    assert_eq!(snapshot.remaining_epochs(), 2);
    assert!(!snapshot.have_rewards_started());
    assert!(service.campaign_addresses().unwrap().is_empty());
    assert_eq!(service.execution_allowed(campaign), Ok(true));
}

#[test]
fn test_setup_through_service_is_guarded() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(1, U256::ZERO);
    let campaign = campaign_address(0);

    assert_eq!(
        service.setup(campaign, acc.alice, acc.router, acc.gauge, WEEK),
        Err(ServiceError::Campaign(CampaignError::OnlyGuards))
    );
    assert_eq!(
        service.set_reward_epochs(campaign, acc.bob, vec![]),
        Err(ServiceError::Campaign(CampaignError::InvalidScheduleLength))
    );
    assert_eq!(
        service.execution_allowed(campaign),
        Err(ServiceError::Campaign(CampaignError::SetupNotCompleted))
    );
}

#[test]
fn test_campaign_funded_elsewhere_is_refused() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(1, e18(10));
    let campaign = campaign_address(0);
    service
        .setup(campaign, acc.bob, acc.alice, acc.gauge, WEEK)
        .unwrap();
    service
        .set_reward_epochs(campaign, acc.bob, vec![e18(1)])
        .unwrap();

    assert_eq!(
        service.distribute(campaign),
        Err(ServiceError::ForeignFundingSource(acc.alice))
    );
    assert_eq!(
        service.campaign_snapshot(campaign).unwrap().remaining_epochs(),
        1
    );
}

#[test]
fn test_operator_send_and_deposit_send() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(0, e18(10));

    let payout = service
        .send_reward_token(acc.bob, acc.gauge, e18(2), Some(DAY * U256::from(8)))
        .unwrap();
    assert_eq!(payout.epoch, DAY * U256::from(8));
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(2));
    assert_eq!(service.campaign_addresses().unwrap(), vec![acc.bob]);

    service
        .with_ledger(|ledger| {
            ledger.mint(acc.reward_token, acc.charlie, e18(5))?;
            ledger.approve(acc.reward_token, acc.charlie, acc.router, e18(5))
        })
        .unwrap()
        .unwrap();

    let payout = service
        .deposit_send_reward_token(acc.charlie, acc.gauge, e18(5), None)
        .unwrap();
    assert_eq!(payout.funding, Funding::PullFrom(acc.charlie));
    assert_eq!(payout.epoch, WEEK);
    assert_eq!(balance(&service, acc.reward_token, acc.charlie), U256::ZERO);
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(7));
    assert_eq!(balance(&service, acc.reward_token, acc.router), e18(8));
    assert_eq!(
        service.campaign_addresses().unwrap(),
        vec![acc.bob, acc.charlie]
    );

    assert_eq!(
        service.send_reward_token(acc.alice, acc.gauge, e18(1), None),
        Err(ServiceError::Distributor(DistributorError::OnlyGuards))
    );
}

#[test]
fn test_deposit_send_without_allowance_tracks_nothing() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(0, U256::ZERO);
    service
        .with_ledger(|ledger| ledger.mint(acc.reward_token, acc.bob, e18(5)))
        .unwrap()
        .unwrap();

    assert!(matches!(
        service.deposit_send_reward_token(acc.bob, acc.gauge, e18(5), None),
        Err(ServiceError::Ledger(LedgerError::InsufficientAllowance { .. }))
    ));
    assert!(service.campaign_addresses().unwrap().is_empty());
    assert_eq!(balance(&service, acc.reward_token, acc.bob), e18(5));
}

#[test]
fn test_deposit_from_contract_uses_router_balance() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(0, e18(3));

    assert_eq!(
        service.deposit_reward_token_from_contract(acc.bob, acc.gauge, e18(4), None),
        Err(ServiceError::Distributor(DistributorError::InsufficientBalance))
    );

    service
        .deposit_reward_token_from_contract(acc.bob, acc.gauge, e18(3), None)
        .unwrap();
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(3));
    assert!(service.campaign_addresses().unwrap().is_empty());
}

#[test]
fn test_recovery_paths() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(0, e18(10));
    let stray = acc.bounty_token;
    service
        .with_ledger(|ledger| ledger.mint(stray, acc.router, e18(2)))
        .unwrap()
        .unwrap();

    service.recover_token(acc.bob, stray, e18(2)).unwrap();
    assert_eq!(balance(&service, stray, acc.recovery), e18(2));

    service
        .recover_token(acc.charlie, acc.reward_token, e18(4))
        .unwrap();
    assert_eq!(balance(&service, acc.reward_token, acc.recovery), e18(4));

    assert_eq!(
        service.recover_token(acc.alice, acc.reward_token, e18(1)),
        Err(ServiceError::Distributor(DistributorError::OnlyGuards))
    );
    assert_eq!(
        service.recover_token(acc.bob, acc.reward_token, U256::ZERO),
        Err(ServiceError::Distributor(DistributorError::InvalidAmount))
    );

    service
        .send_reward_token(acc.bob, acc.gauge, e18(6), None)
        .unwrap();
    assert_eq!(service.forward_from_gauge(acc.gauge), Ok(e18(6)));
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), U256::ZERO);
    assert_eq!(balance(&service, acc.reward_token, acc.recovery), e18(10));
    assert_eq!(service.forward_from_gauge(acc.gauge), Ok(U256::ZERO));
}

#[test]
fn test_gauge_balance_only_reaches_its_recovery_address() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let mut service = deploy(0, e18(10));
    service
        .send_reward_token(acc.bob, acc.gauge, e18(6), None)
        .unwrap();

    assert_eq!(
        service.forward_from_gauge(acc.alice),
        Err(ServiceError::UnknownGauge(acc.alice))
    );
    assert_eq!(balance(&service, acc.reward_token, acc.alice), U256::ZERO);
    assert_eq!(balance(&service, acc.reward_token, acc.gauge), e18(6));

    assert_eq!(
        service.register_gauge(acc.gauge, acc.alice),
        Err(ServiceError::DuplicateGauge(acc.gauge))
    );
    assert_eq!(
        service.register_gauge(acc.alice, acc.alice),
        Err(ServiceError::Distributor(DistributorError::ReceiverNotAllowed))
    );
    assert_eq!(service.gauge_recovery_address(acc.gauge), Some(acc.recovery));

    assert_eq!(service.forward_from_gauge(acc.gauge), Ok(e18(6)));
    assert_eq!(balance(&service, acc.reward_token, acc.alice), U256::ZERO);
    assert_eq!(balance(&service, acc.reward_token, acc.recovery), e18(6));
}

fn rollout_plans() -> [CampaignPlan; 2] {
    [
        CampaignPlan::growth_then_steady(&[e18(1), e18(2)], e18(3), 2, WEEK),
        CampaignPlan::new(vec![e18(5); 3], DAY * U256::from(4)),
    ]
}

#[test]
fn test_rollout_dry_run_touches_nothing() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(2, e18(100));
    let mut tally = RolloutTally::new();

    for (index, plan) in rollout_plans().iter().enumerate() {
        let campaign = campaign_address(index as u8);
        let step = service
            .roll_out(&mut tally, acc.bob, campaign, acc.gauge, plan, true)
            .unwrap();

        assert!(step.setup && step.reward_epochs);
        let snapshot = service.campaign_snapshot(campaign).unwrap();
        assert!(!snapshot.is_setup_complete());
        assert!(!snapshot.is_reward_epochs_set());
    }

    assert_eq!(tally.total_rewards(), e18(24));
    assert_eq!(tally.distribute_events(), 7);
}

#[test]
fn test_rollout_twice_is_a_noop() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(2, e18(100));
    let plans = rollout_plans();
    let mut tally = RolloutTally::new();

    for (index, plan) in plans.iter().enumerate() {
        let campaign = campaign_address(index as u8);
        let step = service
            .roll_out(&mut tally, acc.bob, campaign, acc.gauge, plan, false)
            .unwrap();
        assert!(step.setup && step.reward_epochs);
    }

    let steps = plans
        .iter()
        .enumerate()
        .map(|(index, plan)| {
            let campaign = campaign_address(index as u8);
            service
                .roll_out(&mut tally, acc.charlie, campaign, acc.gauge, plan, false)
                .unwrap()
        })
        .collect::<Vec<_>>();
    assert!(steps.iter().all(|step| step.is_noop() && step.summary.is_none()));

    assert_eq!(tally.total_rewards(), e18(24));
    assert_eq!(tally.distribute_events(), 7);

    let second = service.campaign_snapshot(campaign_address(1)).unwrap();
    assert_eq!(second.funding_source(), Some(acc.router));
    assert_eq!(second.receiving_gauge(), Some(acc.gauge));
    assert_eq!(second.min_epoch_duration(), DAY * U256::from(4));
    assert_eq!(second.all_epochs(), plans[1].epochs.as_slice());

    let release = service.distribute(campaign_address(0)).unwrap();
    assert_eq!(release.amount, e18(3));
    assert_eq!(release.remaining_epochs, 3);
}

#[test]
fn test_rollout_resumes_half_configured_campaign() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(1, e18(100));
    let campaign = campaign_address(0);
    let [plan, _] = rollout_plans();
    let mut tally = RolloutTally::new();

    service
        .setup(campaign, acc.bob, acc.router, acc.gauge, WEEK)
        .unwrap();

    assert_eq!(
        service.roll_out(&mut tally, acc.alice, campaign, acc.gauge, &plan, false),
        Err(ServiceError::Campaign(CampaignError::OnlyGuards))
    );
    assert_eq!(tally, RolloutTally::new());
    assert!(!service.campaign_snapshot(campaign).unwrap().is_reward_epochs_set());

    let step = service
        .roll_out(&mut tally, acc.bob, campaign, acc.gauge, &plan, false)
        .unwrap();
    assert!(!step.setup);
    assert!(step.reward_epochs);
    assert_eq!(step.summary.map(|summary| summary.total), Some(e18(9)));
    assert_eq!(tally.distribute_events(), 4);
}

#[test]
fn test_remove_campaign_address() {
    configure_logs(LevelFilter::Info);
    let acc = actors();
    let service = deploy(0, e18(10));
    service
        .send_reward_token(acc.bob, acc.gauge, e18(1), None)
        .unwrap();
    service
        .send_reward_token(acc.charlie, acc.gauge, e18(1), None)
        .unwrap();

    assert_eq!(
        service.remove_campaign_address(acc.alice, acc.bob),
        Err(ServiceError::Distributor(DistributorError::OnlyGuards))
    );
    assert_eq!(service.remove_campaign_address(acc.charlie, acc.bob), Ok(true));
    assert_eq!(service.campaign_addresses().unwrap(), vec![acc.charlie]);
    assert_eq!(service.remove_campaign_address(acc.charlie, acc.bob), Ok(false));
}
