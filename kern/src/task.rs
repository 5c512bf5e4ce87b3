//! The task table and per-task state machine.
//!
//! A task never owns a waiter list; blocking state is entirely captured by
//! [`TaskState`], and every wake operation scans the task table by
//! ascending index (see [`wake_one`]) rather than walking an explicit
//! queue. A separate blocked-count on each object (kept in the relevant
//! object module) is the authoritative count of waiters and must be
//! decremented exactly once per wake or per [`Kernel::task_reset`].
//!
//! [`Kernel::task_reset`]: crate::kernel::Kernel::task_reset

use abi::{Error, KernResult, ObjectRef};

use crate::arch;

/// One task's position in the state machine described in component 4.2.
///
/// This replaces the packed `(status-class, object-index)` nibble pair of
/// the system this crate's service-call surface is modeled on with a tagged
/// variant: the packed form was a footprint optimization, and the indices it
/// carried are exactly [`ObjectRef`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaskState {
    /// Eligible to run. The scheduler decides which ready task is active.
    Ready,
    /// Suspended by `task_suspend`/a foreign suspend. Resumable only by
    /// `task_resume`.
    PureSuspended,
    /// Suspended by `task_sleep`; `sleep_ticks` counts down to zero.
    Sleeping,
    /// Blocked on a send/receive/obtain/retrieve/allocate call against the
    /// named object.
    Waiting(ObjectRef),
    /// Ran to completion (run-to-completion scheduler only) and will not be
    /// invoked again this boot.
    Finished,
    /// Forced out of the schedulable set; distinct from `PureSuspended` in
    /// that no resume will bring it back.
    Terminated,
}

impl TaskState {
    pub fn is_ready(self) -> bool {
        matches!(self, TaskState::Ready)
    }

    /// The object this task is blocked on, if any.
    pub fn waiting_on(self) -> Option<ObjectRef> {
        match self {
            TaskState::Waiting(obj) => Some(obj),
            _ => None,
        }
    }
}

/// One entry in the fixed-size task table.
///
/// `stack` and `save` are meaningless under the run-to-completion scheduler
/// (component 4.11 has no stacks or saved context there) but are kept on
/// every `Task` rather than behind a second type, so that the rest of the
/// kernel can treat the task table uniformly regardless of which scheduler
/// a build selects.
pub struct Task {
    /// Immutable entry point, fixed at configuration time.
    pub entry: fn(),
    /// Backing storage for this task's stack, if the active scheduler uses
    /// one. Supplied externally at init, one independently-sized slice per
    /// task — mirroring per-object backing arrays elsewhere in this crate.
    pub stack: Option<&'static mut [u8]>,
    /// Saved machine context. See [`crate::arch`].
    pub save: arch::SavedState,
    /// Current position in the state machine.
    pub state: TaskState,
    /// Ticks remaining before a `Sleeping` task wakes on its own. Zero when
    /// not sleeping.
    pub sleep_ticks: u32,
    /// Optional per-task dispatch counter, incremented by the scheduler
    /// each time this task is made active. Present only when the build
    /// enables it.
    pub schedule_count: Option<u32>,
    /// What a blocked task's call must return once unblocked. Defaults to
    /// success; a peer operation or a reset sets it before waking the task.
    pub blocking_return: KernResult<()>,
    /// Per-task signal flags (component 4.9). ORed into by `signals_send`,
    /// read-and-cleared by `signals_receive`.
    pub signals: u8,
}

impl Task {
    /// Builds a fresh, never-run task in `PureSuspended` state, as produced
    /// by init (component 4.13) and by `task_reset`.
    pub fn new(entry: fn(), stack: Option<&'static mut [u8]>) -> Self {
        let save = match &stack {
            Some(s) => {
                let base = s.as_ptr() as u32;
                let top = base.wrapping_add(s.len() as u32);
                arch::SavedState::fresh(entry as usize as u32, top)
            }
            None => arch::SavedState::default(),
        };
        Task {
            entry,
            stack,
            save,
            state: TaskState::PureSuspended,
            sleep_ticks: 0,
            schedule_count: None,
            blocking_return: Ok(()),
            signals: 0,
        }
    }

    /// Re-initializes this task's private state as `task_reset` (component
    /// 4.2) requires: sleep counter and signals cleared, blocking-return
    /// slot armed with the reset-observed error, state forced to
    /// `PureSuspended`. The caller is responsible for decrementing the
    /// blocked-count of whatever object this task was waiting on, using the
    /// `ObjectRef` this method hands back.
    pub fn reset(&mut self) -> Option<ObjectRef> {
        let waiting_on = self.state.waiting_on();
        self.sleep_ticks = 0;
        self.signals = 0;
        // Open question 3 in the design notes: a reset while blocked leaves
        // no well-defined return value upstream. We set one explicitly so a
        // task that reenters its blocking loop after a reset it didn't ask
        // for observes a deliberate, documented error rather than stale
        // state.
        self.blocking_return = if waiting_on.is_some() {
            Err(Error::InvalidTask)
        } else {
            Ok(())
        };
        self.state = TaskState::PureSuspended;
        waiting_on
    }
}

/// Scans `tasks` by ascending index and transitions the first task waiting
/// on `obj` to `Ready`, recording `result` in its blocking-return slot.
///
/// Returns the woken task's index, or `None` if nobody was waiting. The
/// caller must decrement the relevant object's blocked-count exactly once
/// when this returns `Some`.
pub fn wake_one(tasks: &mut [Task], obj: ObjectRef, result: KernResult<()>) -> Option<usize> {
    let idx = tasks.iter().position(|t| t.state == TaskState::Waiting(obj))?;
    tasks[idx].blocking_return = result;
    tasks[idx].state = TaskState::Ready;
    Some(idx)
}

/// Scans `tasks` by ascending index and wakes *every* task waiting on
/// `obj`, recording `result` in each. Used by the reset operations, which
/// must drain every waiter (component 4.4, 4.5, 4.6, 4.7).
///
/// Returns the number of tasks woken, which the caller subtracts from the
/// object's blocked-count (driving it to zero).
pub fn wake_all(tasks: &mut [Task], obj: ObjectRef, result: KernResult<()>) -> usize {
    let mut woken = 0;
    for task in tasks.iter_mut() {
        if task.state == TaskState::Waiting(obj) {
            task.blocking_return = result;
            task.state = TaskState::Ready;
            woken += 1;
        }
    }
    woken
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::ObjectClass;

    fn dummy() {}

    #[test]
    fn new_task_is_pure_suspended() {
        let t = Task::new(dummy, None);
        assert_eq!(t.state, TaskState::PureSuspended);
        assert_eq!(t.blocking_return, Ok(()));
    }

    #[test]
    fn wake_one_picks_lowest_index() {
        let obj = ObjectRef::new(ObjectClass::Mailbox, 0);
        let mut tasks = vec![
            Task::new(dummy, None),
            Task::new(dummy, None),
            Task::new(dummy, None),
        ];
        tasks[1].state = TaskState::Waiting(obj);
        tasks[2].state = TaskState::Waiting(obj);

        let woken = wake_one(&mut tasks, obj, Ok(())).unwrap();
        assert_eq!(woken, 1);
        assert_eq!(tasks[1].state, TaskState::Ready);
        assert_eq!(tasks[2].state, TaskState::Waiting(obj));
    }

    #[test]
    fn wake_all_drains_every_waiter() {
        let obj = ObjectRef::new(ObjectClass::Semaphore, 3);
        let mut tasks = vec![
            Task::new(dummy, None),
            Task::new(dummy, None),
            Task::new(dummy, None),
        ];
        tasks[0].state = TaskState::Waiting(obj);
        tasks[2].state = TaskState::Waiting(obj);

        let woken = wake_all(&mut tasks, obj, Err(Error::SemaphoreWasReset));
        assert_eq!(woken, 2);
        assert!(tasks[0].state.is_ready());
        assert!(tasks[2].state.is_ready());
        assert_eq!(tasks[0].blocking_return, Err(Error::SemaphoreWasReset));
    }

    #[test]
    fn reset_clears_private_state_and_reports_waited_object() {
        let obj = ObjectRef::new(ObjectClass::Queue, 1);
        let mut t = Task::new(dummy, None);
        t.state = TaskState::Waiting(obj);
        t.sleep_ticks = 4;
        t.signals = 0xff;

        let was_waiting = t.reset();
        assert_eq!(was_waiting, Some(obj));
        assert_eq!(t.state, TaskState::PureSuspended);
        assert_eq!(t.sleep_ticks, 0);
        assert_eq!(t.signals, 0);
        assert_eq!(t.blocking_return, Err(Error::InvalidTask));
    }
}
