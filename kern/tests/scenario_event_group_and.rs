//! End-to-end scenario (spec section 8, scenario 3): an event group AND
//! retrieve only becomes satisfiable once both halves of its mask have
//! been set by separate `OR` updates.
//!
//! Making a task genuinely block on `event_group_retrieve(Suspend::Yes)`
//! and then resume it from a second task requires two real task stacks,
//! which only the `arm_m` backend has (see the doc comment on
//! `scenario_round_robin_producer_consumer` for why the host-testable
//! `simulator` backend can't do this from one OS thread). The
//! wake-and-recheck mechanic itself — every blocked waiter on a group is
//! given a chance to re-evaluate on every set, regardless of whether its
//! own request is now satisfied — is covered with full fidelity, including
//! real `Waiting` state, by
//! `kernel::tests::event_group_set_wakes_a_waiter_to_recheck` inside the
//! kernel crate, which has the `pub(crate)` access needed to park a task
//! without a real second stack. This test instead exercises the externally
//! observable retrieve contract non-blocking: AND requires every requested
//! bit to be present, and each `OR` set only ever contributes its own mask.

use abi::{Error, EventOp, Suspend};
use kern::config::{KernelConfig, TaskConfig};
use kern::sched::RoundRobin;
use kern::Kernel;

fn dummy() {}

#[test]
fn event_group_and_retrieve_succeeds_only_once_fully_matched() {
    let mut k: Kernel<RoundRobin, 1, 0, 0, 0, 0, 0, 1, 0> = Kernel::new(KernelConfig {
        tasks: [TaskConfig::new(dummy, None)],
        pools: [],
        queues: [],
        pipes: [],
        semaphores: [],
        timers: [],
        time_slice_ticks: 0,
    });
    k.start();

    assert_eq!(
        k.event_group_retrieve(0, 0b1100, EventOp::And, Suspend::No),
        Err(Error::NotPresent),
        "group starts at zero"
    );

    k.event_group_set(0, 0b0100, EventOp::Or).unwrap();
    assert_eq!(
        k.event_group_retrieve(0, 0b1100, EventOp::And, Suspend::No),
        Err(Error::NotPresent),
        "only half the requested mask is set"
    );

    k.event_group_set(0, 0b1000, EventOp::Or).unwrap();
    assert_eq!(
        k.event_group_retrieve(0, 0b1100, EventOp::And, Suspend::No),
        Ok(0b1100),
        "both requested bits are now present"
    );
}
