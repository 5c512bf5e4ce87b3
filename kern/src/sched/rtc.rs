//! Run-to-completion: the one scheduling policy that is not shaped like
//! [`super::Scheduler`] (component 4.11).
//!
//! There are no stacks, no saved context, and no yielding: tasks are
//! ordinary procedures invoked directly, in an infinite round over the task
//! table, and each one must return on its own before the next one runs.
//! Blocking calls are forbidden at build time under this policy, so the
//! object modules never need to consult task state here beyond "ready or
//! not".

use crate::task::{Task, TaskState};

use super::{Hint, Scheduler};

/// Zero-sized marker selecting run-to-completion as a [`crate::kernel::Kernel`]
/// type parameter.
///
/// `Rtc` implements [`Scheduler`] only so `Kernel<Rtc, ...>` type-checks
/// alongside the other three policies and its blocking-capable service calls
/// can reject `Suspend::Yes` uniformly through [`Scheduler::BLOCKING_ALLOWED`]
/// rather than through a special case in every object module. Its
/// `reschedule` is never actually invoked: nothing in this policy blocks, so
/// the stack-switch path is unreachable. Task dispatch under `Rtc` instead
/// goes through [`run_round`], driven directly by application startup code
/// rather than by `Kernel`.
pub struct Rtc;

impl Scheduler for Rtc {
    const BLOCKING_ALLOWED: bool = false;
    const RELINQUISH_IS_NOOP: bool = true;

    fn select_initial(_tasks: &[Task]) -> usize {
        0
    }

    fn reschedule(_active: usize, _tasks: &[Task], _hint: Hint) -> usize {
        unreachable!("run-to-completion never reaches the stack-switch path")
    }
}

/// Runs one full round over `tasks`: calls the entry point of every task
/// still in `Ready` state, in ascending index order, skipping any others
/// (which can only be `PureSuspended`, `Finished`, or `Terminated` — nothing
/// in this policy ever blocks).
///
/// Intended to be invoked in a loop by application startup code; this
/// function itself runs exactly one round so callers retain control over
/// whether/when to stop (for example, in a host test that wants to assert
/// on state after a bounded number of rounds).
pub fn run_round(tasks: &mut [Task]) {
    for task in tasks.iter_mut() {
        if task.state.is_ready() {
            (task.entry)();
        }
    }
}

/// `task_relinquish` is a no-op under run-to-completion (component 4.11):
/// a task that runs to completion is, definitionally, not going to yield
/// mid-flight.
pub fn relinquish(_tasks: &mut [Task]) {}

/// Marks `index` `Finished`, so future rounds skip it. Tasks under this
/// policy that intend to run only once call this themselves before
/// returning; tasks that loop forever never call it.
pub fn finish(tasks: &mut [Task], index: usize) {
    tasks[index].state = TaskState::Finished;
}

#[cfg(test)]
mod tests {
    use super::*;

    static mut CALLS: u32 = 0;

    fn counting_task() {
        unsafe { CALLS += 1 };
    }

    #[test]
    fn run_round_invokes_only_ready_tasks() {
        unsafe { CALLS = 0 };
        let mut tasks = vec![
            Task::new(counting_task, None),
            Task::new(counting_task, None),
        ];
        tasks[0].state = TaskState::Ready;
        tasks[1].state = TaskState::PureSuspended;

        run_round(&mut tasks);
        assert_eq!(unsafe { CALLS }, 1);
    }

    #[test]
    fn finish_removes_task_from_future_rounds() {
        unsafe { CALLS = 0 };
        let mut tasks = vec![Task::new(counting_task, None)];
        tasks[0].state = TaskState::Ready;

        run_round(&mut tasks);
        finish(&mut tasks, 0);
        run_round(&mut tasks);

        assert_eq!(unsafe { CALLS }, 1);
        assert_eq!(tasks[0].state, TaskState::Finished);
    }
}
