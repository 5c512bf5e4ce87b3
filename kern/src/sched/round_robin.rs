//! Round-robin scheduling: each task gets a private stack, and the next
//! active task is always the next ready one by strictly increasing index,
//! wrapping modulo the task count (component 4.11).

use crate::task::Task;

use super::{scan_from, Hint, Scheduler};

/// Zero-sized marker selecting the round-robin policy at the type level.
pub struct RoundRobin;

impl Scheduler for RoundRobin {
    fn reschedule(active: usize, tasks: &[Task], _hint: Hint) -> usize {
        // Wakes never preempt under round-robin; only relinquish, blocking,
        // and the tick handler drive a reschedule, so the hint carries no
        // information this policy needs.
        scan_from(active, tasks, |t| t.state.is_ready())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskState;

    fn dummy() {}

    #[test]
    fn advances_to_next_ready_task_in_index_order() {
        let mut tasks = vec![
            Task::new(dummy, None),
            Task::new(dummy, None),
            Task::new(dummy, None),
        ];
        for t in &mut tasks {
            t.state = TaskState::Ready;
        }
        assert_eq!(RoundRobin::reschedule(0, &tasks, Hint::None), 1);
        assert_eq!(RoundRobin::reschedule(2, &tasks, Hint::None), 0);
    }

    #[test]
    fn skips_non_ready_tasks() {
        let mut tasks = vec![
            Task::new(dummy, None),
            Task::new(dummy, None),
            Task::new(dummy, None),
        ];
        tasks[0].state = TaskState::Ready;
        tasks[1].state = TaskState::PureSuspended;
        tasks[2].state = TaskState::Ready;
        assert_eq!(RoundRobin::reschedule(0, &tasks, Hint::None), 2);
    }

    #[test]
    fn wraps_back_to_active_if_alone_ready() {
        let mut tasks = vec![Task::new(dummy, None), Task::new(dummy, None)];
        tasks[0].state = TaskState::Ready;
        tasks[1].state = TaskState::PureSuspended;
        assert_eq!(RoundRobin::reschedule(0, &tasks, Hint::None), 0);
    }
}
