//! Priority scheduling: task index *is* priority, with index 0 the most
//! important (component 4.11). A wake of a higher-or-equal-priority task
//! preempts the caller immediately; a wake of a lower-priority task does
//! not. This is the only one of the four policies that consults the
//! [`Hint`] passed to [`Scheduler::reschedule`].

use crate::task::Task;

use super::{Hint, Scheduler};

/// Zero-sized marker selecting the priority policy at the type level.
pub struct Priority;

impl Scheduler for Priority {
    // `task_relinquish` is not part of this policy's surface (component
    // 4.11): a task cannot voluntarily give up the processor to a
    // lower-priority peer, since the scheduler would simply hand it right
    // back the next time anything reschedules.
    const HAS_RELINQUISH: bool = false;

    // A wake of a higher-or-equal-priority task preempts the caller
    // immediately (component 4.11) — this is what makes `Hint::Woke` worth
    // consulting at all under this policy.
    const PREEMPTS_ON_WAKE: bool = true;

    fn reschedule(active: usize, tasks: &[Task], hint: Hint) -> usize {
        if !tasks[active].state.is_ready() {
            // The active task is no longer runnable regardless of what
            // woke; fall back to a full scan for the most important ready
            // task.
            return lowest_ready(tasks);
        }

        match hint {
            Hint::None => lowest_ready(tasks),
            Hint::Woke(woken) => {
                if woken <= active {
                    woken
                } else {
                    active
                }
            }
        }
    }
}

fn lowest_ready(tasks: &[Task]) -> usize {
    tasks
        .iter()
        .position(|t| t.state.is_ready())
        .expect("no ready task")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskState;

    fn dummy() {}

    fn ready_tasks(n: usize) -> Vec<Task> {
        let mut tasks = Vec::new();
        for _ in 0..n {
            let mut t = Task::new(dummy, None);
            t.state = TaskState::Ready;
            tasks.push(t);
        }
        tasks
    }

    #[test]
    fn no_hint_picks_lowest_index() {
        let tasks = ready_tasks(4);
        assert_eq!(Priority::reschedule(2, &tasks, Hint::None), 0);
    }

    #[test]
    fn higher_or_equal_priority_wake_preempts() {
        let tasks = ready_tasks(4);
        // Active is task 2; task 1 is more important (lower index) and
        // just woke, so it must preempt.
        assert_eq!(Priority::reschedule(2, &tasks, Hint::Woke(1)), 1);
        // A wake of task 2 itself (equal priority) also "preempts" in the
        // sense of being selected, per the <= rule.
        assert_eq!(Priority::reschedule(2, &tasks, Hint::Woke(2)), 2);
    }

    #[test]
    fn lower_priority_wake_does_not_preempt() {
        let tasks = ready_tasks(4);
        assert_eq!(Priority::reschedule(1, &tasks, Hint::Woke(3)), 1);
    }

    #[test]
    fn active_no_longer_ready_forces_full_scan() {
        let mut tasks = ready_tasks(4);
        tasks[1].state = TaskState::Waiting(abi::ObjectRef::new(
            abi::ObjectClass::Semaphore,
            0,
        ));
        assert_eq!(Priority::reschedule(1, &tasks, Hint::Woke(3)), 0);
    }
}
