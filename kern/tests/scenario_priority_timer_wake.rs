//! End-to-end scenario (spec section 8, scenario 2): a timer expiration
//! drives a signal that resumes the highest-priority task, which must then
//! preempt whatever is running.
//!
//! A timer's expiration callback in this crate is a plain `fn(usize)` with
//! no handle back to the `Kernel` it belongs to (component 9 treats the
//! callback itself, like the context switch, as an external primitive with
//! a contract). Wiring a real callback to call back into a specific running
//! kernel instance is the application-level glue this crate doesn't
//! respecify (spec section 1: "the thin application-facing name mapping").
//! This test stands in for that glue by performing the same two calls
//! (`signals_send` then `task_resume`) the callback body would make.

use abi::TimerEnable;
use kern::config::{KernelConfig, TaskConfig, TimerConfig};
use kern::sched::Priority;
use kern::Kernel;

fn dummy() {}

#[test]
fn priority_timer_driven_wake_preempts_to_highest_priority_task() {
    let mut k: Kernel<Priority, 3, 0, 0, 0, 0, 0, 0, 1> = Kernel::new(KernelConfig {
        tasks: [
            TaskConfig::new(dummy, None).suspended(),
            TaskConfig::new(dummy, None),
            TaskConfig::new(dummy, None),
        ],
        pools: [],
        queues: [],
        pipes: [],
        semaphores: [],
        timers: [TimerConfig {
            initial: 25,
            reschedule: 25,
            callback: None,
        }],
        time_slice_ticks: 0,
    });
    assert_eq!(
        k.start(),
        1,
        "task 0 starts pure-suspended; task 1 is the highest-priority ready task at boot"
    );

    k.timer_control(0, TimerEnable::Enable).unwrap();
    for _ in 0..24 {
        k.tick();
        assert_eq!(k.active_task(), 1, "the timer hasn't expired yet");
    }

    k.tick(); // the 25th tick: the timer expires
    assert_eq!(k.timer_get_remaining(0).unwrap(), 25, "reschedule period reloaded it");

    // Stand-in for the timer's expiration callback: send signal 1 to task 1.
    k.signals_send(1, 0b1).unwrap();
    assert_eq!(k.signals_receive(), 0b1, "task 1 observes the signal it was sent");
    // Task 1, having observed the signal, resumes task 0.
    k.task_resume(0).unwrap();

    assert_eq!(
        k.active_task(),
        0,
        "task 0 outranks task 1 and must preempt immediately on resume"
    );
}
