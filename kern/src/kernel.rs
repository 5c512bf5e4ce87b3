//! The kernel object: owns every object table and dispatches every service
//! call (components 2, 4, 4.13).
//!
//! Per-class table sizes are const generics rather than a single `N`,
//! because nothing requires every class to be sized alike (component 3:
//! "0-16 instances of each category, chosen independently"). A class sized
//! to zero becomes a zero-length array; every operation against it still
//! type-checks (its index bound is always violated) and the optimizer is
//! free to delete the whole path.
//!
//! Blocking service calls follow one shape throughout this module: attempt
//! the operation inside a critical section, and if it can't complete and the
//! caller asked to block, mark the caller `Waiting`, leave the critical
//! section, and perform a real context switch. When execution returns here
//! (the caller has been woken), consult `blocking_return` — `Err` propagates
//! immediately, `Ok` means retry the attempt, which is tried again from the
//! top of the loop. This mirrors the wake-by-scan design in
//! [`crate::task`]: waking a task never guarantees its retry will succeed
//! (something else may have gotten there first), so blocked tasks loop
//! rather than assume a single wake is a single success.

use core::array;
use core::marker::PhantomData;

use abi::{Error, EventOp, ExecutionContext, KernResult, ObjectClass, ObjectRef, Suspend, TimerEnable};

use crate::arch::{self, klog, CriticalSection};
use crate::clock::Clock;
use crate::config::KernelConfig;
use crate::event::EventGroup;
use crate::mailbox::Mailbox;
use crate::partition::{self, PartitionPool};
use crate::pipe::Pipe;
use crate::queue::Queue;
use crate::sched::{Hint, Scheduler};
use crate::semaphore::Semaphore;
use crate::signals;
use crate::task::{Task, TaskState};
use crate::timer::Timer;

#[cfg(feature = "api-parameter-checking")]
#[inline]
fn check_index(index: usize, count: usize, err: Error) -> KernResult<()> {
    if index >= count {
        return Err(err);
    }
    Ok(())
}

#[cfg(not(feature = "api-parameter-checking"))]
#[inline]
fn check_index(_index: usize, _count: usize, _err: Error) -> KernResult<()> {
    Ok(())
}

/// Picks two distinct mutable elements out of a slice at once. Used for a
/// context switch, which always needs to touch both the outgoing and
/// incoming task's saved state simultaneously.
fn borrow_two_mut<T>(slice: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    kinvariant!(a != b);
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// The kernel: every object table, the task table, the wall clock, and the
/// bookkeeping a scheduler needs but doesn't itself store.
pub struct Kernel<
    S: Scheduler,
    const NTASKS: usize,
    const NPOOLS: usize,
    const NMAILBOXES: usize,
    const NQUEUES: usize,
    const NPIPES: usize,
    const NSEMAPHORES: usize,
    const NEVENTGROUPS: usize,
    const NTIMERS: usize,
> {
    tasks: [Task; NTASKS],
    pools: [PartitionPool; NPOOLS],
    mailboxes: [Mailbox; NMAILBOXES],
    queues: [Queue; NQUEUES],
    pipes: [Pipe; NPIPES],
    semaphores: [Semaphore; NSEMAPHORES],
    event_groups: [EventGroup; NEVENTGROUPS],
    timers: [Timer; NTIMERS],
    clock: Clock,
    active: usize,
    /// Reload value for the time-slice countdown; unused by every other
    /// scheduler.
    slice_reload: u32,
    slice_remaining: u32,
    _scheduler: PhantomData<S>,
}

impl<
        S: Scheduler,
        const NTASKS: usize,
        const NPOOLS: usize,
        const NMAILBOXES: usize,
        const NQUEUES: usize,
        const NPIPES: usize,
        const NSEMAPHORES: usize,
        const NEVENTGROUPS: usize,
        const NTIMERS: usize,
    > Kernel<S, NTASKS, NPOOLS, NMAILBOXES, NQUEUES, NPIPES, NSEMAPHORES, NEVENTGROUPS, NTIMERS>
{
    /// Builds every object table from `config` (component 4.13, steps 1-2).
    /// Every task starts `PureSuspended`, flipped to `Ready` here for those
    /// marked `autostart`. Does not itself start a task running; call
    /// [`Kernel::start`] once logging and any other pre-dispatch setup is
    /// done.
    pub fn new(
        config: KernelConfig<NTASKS, NPOOLS, NQUEUES, NPIPES, NSEMAPHORES, NTIMERS>,
    ) -> Self {
        let KernelConfig {
            tasks,
            pools,
            queues,
            pipes,
            semaphores,
            timers,
            time_slice_ticks,
        } = config;

        let tasks = tasks.map(|c| {
            let mut t = Task::new(c.entry, c.stack);
            if c.autostart {
                t.state = TaskState::Ready;
            }
            t
        });
        let pools = pools.map(|c| PartitionPool::new(c.storage, c.partition_size));
        let mailboxes = array::from_fn(|_| Mailbox::new());
        let queues = queues.map(|c| Queue::new(c.storage));
        let pipes = pipes.map(|c| Pipe::new(c.storage, c.message_size));
        let semaphores = semaphores.map(|c| Semaphore::new(c.initial));
        let event_groups = array::from_fn(|_| EventGroup::new());
        let timers = timers.map(|c| Timer::new(c.initial, c.reschedule, c.callback));

        arch::set_execution_context(ExecutionContext::Startup);

        klog::info!(
            "kernel init: {} tasks, {} pools, {} mailboxes, {} queues, {} pipes, \
             {} semaphores, {} event groups, {} timers",
            NTASKS,
            NPOOLS,
            NMAILBOXES,
            NQUEUES,
            NPIPES,
            NSEMAPHORES,
            NEVENTGROUPS,
            NTIMERS,
        );

        Kernel {
            tasks,
            pools,
            mailboxes,
            queues,
            pipes,
            semaphores,
            event_groups,
            timers,
            clock: Clock::new(),
            active: 0,
            slice_reload: time_slice_ticks,
            slice_remaining: time_slice_ticks,
            _scheduler: PhantomData,
        }
    }

    /// Picks the first active task (component 4.13, step 3) and returns its
    /// index. Application startup is expected to transfer control to it
    /// directly; this crate has no notion of "main" beyond that first pick.
    /// Also retires the execution context from `Startup` to `Task`: from
    /// here on, every further critical section actually masks interrupts.
    pub fn start(&mut self) -> usize {
        self.active = S::select_initial(&self.tasks);
        arch::set_execution_context(ExecutionContext::Task);
        klog::debug!("starting task {}", self.active);
        self.active
    }

    pub fn active_task(&self) -> usize {
        self.active
    }

    pub fn clock_ticks(&self) -> u32 {
        self.clock.ticks()
    }

    /// Current state of `task`, for application or test code that wants to
    /// observe the state machine without driving a real switch.
    pub fn task_state(&self, task: usize) -> KernResult<TaskState> {
        check_index(task, NTASKS, Error::InvalidTask)?;
        Ok(self.tasks[task].state)
    }

    fn switch_to_index(&mut self, next: usize) {
        if next == self.active {
            return;
        }
        if S::HAS_TIME_SLICE {
            self.slice_remaining = self.slice_reload;
        }
        klog::trace!("switch: task {} -> task {}", self.active, next);
        let (from, to) = borrow_two_mut(&mut self.tasks, self.active, next);
        self.active = next;
        unsafe { arch::switch_context(from, to) };
    }

    /// Marks the active task `Waiting(obj)` and switches away from it. When
    /// this returns, the caller has been woken; the result is whatever the
    /// waker (or a reset) recorded in `blocking_return`.
    fn block_active(&mut self, obj: ObjectRef) -> KernResult<()> {
        let active = self.active;
        self.tasks[active].blocking_return = Ok(());
        self.tasks[active].state = TaskState::Waiting(obj);
        let next = S::reschedule(active, &self.tasks, Hint::None);
        self.switch_to_index(next);
        self.tasks[self.active].blocking_return
    }

    /// Wakes the one task (if any) waiting on `obj`, decrements its
    /// blocked-count via `dec`, and, under a policy that preempts on wake,
    /// immediately reconsiders who should be active.
    fn signal_one(&mut self, obj: ObjectRef, result: KernResult<()>, dec: impl FnOnce(&mut Self)) {
        if let Some(woken) = crate::task::wake_one(&mut self.tasks, obj, result) {
            dec(self);
            if S::PREEMPTS_ON_WAKE {
                let next = S::reschedule(self.active, &self.tasks, Hint::Woke(woken));
                self.switch_to_index(next);
            }
        }
    }

    /// Wakes every task waiting on `obj`, decrementing its blocked-count
    /// once per waiter woken, then (under a policy that preempts on wake)
    /// reconsiders who should be active with a full scan.
    fn signal_all(&mut self, obj: ObjectRef, result: KernResult<()>, mut dec: impl FnMut(&mut Self)) {
        let woken = crate::task::wake_all(&mut self.tasks, obj, result);
        for _ in 0..woken {
            dec(self);
        }
        if woken > 0 && S::PREEMPTS_ON_WAKE {
            let next = S::reschedule(self.active, &self.tasks, Hint::None);
            self.switch_to_index(next);
        }
    }

    fn dec_blocked(&mut self, obj: ObjectRef) {
        match obj.class {
            ObjectClass::PartitionPool => self.pools[obj.index as usize].dec_blocked(),
            ObjectClass::Mailbox => self.mailboxes[obj.index as usize].dec_blocked(),
            ObjectClass::Queue => self.queues[obj.index as usize].dec_blocked(),
            ObjectClass::Pipe => self.pipes[obj.index as usize].dec_blocked(),
            ObjectClass::Semaphore => self.semaphores[obj.index as usize].dec_blocked(),
            ObjectClass::EventGroup => self.event_groups[obj.index as usize].dec_blocked(),
            ObjectClass::Timer => unreachable!("tasks never block on timers"),
        }
    }

    // ---- task operations (component 4.2) ----

    pub fn task_suspend(&mut self, task: usize) -> KernResult<()> {
        check_index(task, NTASKS, Error::InvalidTask)?;
        {
            let _cs = CriticalSection::enter();
            self.tasks[task].state = TaskState::PureSuspended;
        }
        if task == self.active {
            let next = S::reschedule(self.active, &self.tasks, Hint::None);
            self.switch_to_index(next);
        }
        Ok(())
    }

    pub fn task_resume(&mut self, task: usize) -> KernResult<()> {
        check_index(task, NTASKS, Error::InvalidTask)?;
        let woken = {
            let _cs = CriticalSection::enter();
            if self.tasks[task].state != TaskState::PureSuspended {
                return Err(Error::InvalidResume);
            }
            self.tasks[task].state = TaskState::Ready;
            task
        };
        if S::PREEMPTS_ON_WAKE {
            let next = S::reschedule(self.active, &self.tasks, Hint::Woke(woken));
            self.switch_to_index(next);
        }
        Ok(())
    }

    /// Puts the active task to sleep for `ticks` (component 4.2). A
    /// `ticks == 0` request is a no-op, per the same reasoning that makes
    /// `task_relinquish` meaningful only when there is somewhere else to go.
    pub fn task_sleep(&mut self, ticks: u32) {
        if ticks == 0 {
            return;
        }
        let active = self.active;
        {
            let _cs = CriticalSection::enter();
            self.tasks[active].sleep_ticks = ticks;
            self.tasks[active].state = TaskState::Sleeping;
        }
        let next = S::reschedule(active, &self.tasks, Hint::None);
        self.switch_to_index(next);
    }

    /// Voluntarily gives up the processor (component 4.11). A no-op under
    /// run-to-completion; not part of the priority policy's surface at all
    /// (`kinvariant!` flags a build that calls it anyway).
    pub fn task_relinquish(&mut self) {
        kinvariant!(
            S::HAS_RELINQUISH,
            "task_relinquish is not part of this scheduler's call surface"
        );
        if S::RELINQUISH_IS_NOOP || !S::HAS_RELINQUISH {
            return;
        }
        let next = S::reschedule(self.active, &self.tasks, Hint::None);
        self.switch_to_index(next);
    }

    /// Resets `task` to its freshly-configured state (component 4.2). If it
    /// was blocked, the relevant object's blocked-count is decremented and
    /// the (never-run-again) blocking call would have observed
    /// `Error::InvalidTask`, per design notes open question 3.
    pub fn task_reset(&mut self, task: usize) -> KernResult<()> {
        check_index(task, NTASKS, Error::InvalidTask)?;
        let waiting_on = {
            let _cs = CriticalSection::enter();
            self.tasks[task].reset()
        };
        if let Some(obj) = waiting_on {
            self.dec_blocked(obj);
        }
        Ok(())
    }

    /// Reports the distance, in bytes, between `probe` (an address on
    /// `task`'s own stack, typically the address of a local variable at the
    /// caller's current depth) and the base of its configured stack
    /// (component 4.2). Undefined — reported as zero — for a task with no
    /// stack (run-to-completion).
    pub fn task_check_stack(&self, task: usize, probe: *const u8) -> KernResult<usize> {
        check_index(task, NTASKS, Error::InvalidTask)?;
        match &self.tasks[task].stack {
            Some(stack) => {
                let base = stack.as_ptr() as usize;
                Ok((probe as usize).saturating_sub(base))
            }
            None => Ok(0),
        }
    }

    pub fn signals_send(&mut self, task: usize, mask: u8) -> KernResult<()> {
        check_index(task, NTASKS, Error::InvalidTask)?;
        let _cs = CriticalSection::enter();
        signals::send(&mut self.tasks[task], mask);
        Ok(())
    }

    pub fn signals_receive(&mut self) -> u8 {
        let active = self.active;
        let _cs = CriticalSection::enter();
        signals::receive(&mut self.tasks[active])
    }

    // ---- partition pools (component 4.3) ----

    pub fn partition_allocate(&mut self, pool: usize, suspend: Suspend) -> KernResult<*mut u8> {
        check_index(pool, NPOOLS, Error::InvalidPool)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if let Some(ptr) = self.pools[pool].try_allocate(pool as u8) {
                    return Ok(ptr);
                }
                if !suspend.is_yes() {
                    return Err(Error::NoPartition);
                }
                self.pools[pool].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::PartitionPool, pool as u8))?;
        }
    }

    /// Frees a partition previously returned by `partition_allocate`. The
    /// owning pool is read back from the header byte rather than supplied
    /// by the caller (component 4.3).
    pub fn partition_deallocate(&mut self, ptr: *mut u8) -> KernResult<()> {
        if ptr.is_null() {
            return Err(Error::InvalidPointer);
        }
        let _cs = CriticalSection::enter();
        // Safety: the caller's contract for this call is that `ptr` was
        // returned by a prior `partition_allocate` on this kernel.
        let header = unsafe { partition::header_byte(ptr) };
        let pool = partition::owning_pool(header).ok_or(Error::InvalidPointer)? as usize;
        check_index(pool, NPOOLS, Error::InvalidPointer)?;
        unsafe { partition::clear_header(ptr) };
        self.pools[pool].deallocate_unchecked();
        drop(_cs);
        self.signal_one(
            ObjectRef::new(ObjectClass::PartitionPool, pool as u8),
            Ok(()),
            |k| k.pools[pool].dec_blocked(),
        );
        Ok(())
    }

    // ---- mailboxes (component 4.4) ----

    pub fn mailbox_send(&mut self, mbox: usize, message: usize, suspend: Suspend) -> KernResult<()> {
        check_index(mbox, NMAILBOXES, Error::InvalidMailbox)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.mailboxes[mbox].try_send(message) {
                    drop(_cs);
                    self.signal_one(ObjectRef::new(ObjectClass::Mailbox, mbox as u8), Ok(()), |k| {
                        k.mailboxes[mbox].dec_blocked()
                    });
                    return Ok(());
                }
                if !suspend.is_yes() {
                    return Err(Error::MailboxFull);
                }
                self.mailboxes[mbox].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Mailbox, mbox as u8))?;
        }
    }

    pub fn mailbox_receive(&mut self, mbox: usize, suspend: Suspend) -> KernResult<usize> {
        check_index(mbox, NMAILBOXES, Error::InvalidMailbox)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if let Some(message) = self.mailboxes[mbox].try_receive() {
                    drop(_cs);
                    self.signal_one(ObjectRef::new(ObjectClass::Mailbox, mbox as u8), Ok(()), |k| {
                        k.mailboxes[mbox].dec_blocked()
                    });
                    return Ok(message);
                }
                if !suspend.is_yes() {
                    return Err(Error::MailboxEmpty);
                }
                self.mailboxes[mbox].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Mailbox, mbox as u8))?;
        }
    }

    pub fn mailbox_reset(&mut self, mbox: usize) -> KernResult<()> {
        check_index(mbox, NMAILBOXES, Error::InvalidMailbox)?;
        {
            let _cs = CriticalSection::enter();
            self.mailboxes[mbox].clear();
        }
        self.signal_all(
            ObjectRef::new(ObjectClass::Mailbox, mbox as u8),
            Err(Error::MailboxWasReset),
            |k| k.mailboxes[mbox].dec_blocked(),
        );
        Ok(())
    }

    // ---- queues (component 4.5) ----

    pub fn queue_send(&mut self, queue: usize, value: usize, suspend: Suspend) -> KernResult<()> {
        check_index(queue, NQUEUES, Error::InvalidQueue)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.queues[queue].try_send(value) {
                    drop(_cs);
                    self.signal_one(ObjectRef::new(ObjectClass::Queue, queue as u8), Ok(()), |k| {
                        k.queues[queue].dec_blocked()
                    });
                    return Ok(());
                }
                if !suspend.is_yes() {
                    return Err(Error::QueueFull);
                }
                self.queues[queue].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Queue, queue as u8))?;
        }
    }

    pub fn queue_jam(&mut self, queue: usize, value: usize, suspend: Suspend) -> KernResult<()> {
        check_index(queue, NQUEUES, Error::InvalidQueue)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.queues[queue].try_jam(value) {
                    drop(_cs);
                    self.signal_one(ObjectRef::new(ObjectClass::Queue, queue as u8), Ok(()), |k| {
                        k.queues[queue].dec_blocked()
                    });
                    return Ok(());
                }
                if !suspend.is_yes() {
                    return Err(Error::QueueFull);
                }
                self.queues[queue].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Queue, queue as u8))?;
        }
    }

    pub fn queue_receive(&mut self, queue: usize, suspend: Suspend) -> KernResult<usize> {
        check_index(queue, NQUEUES, Error::InvalidQueue)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if let Some(value) = self.queues[queue].try_receive() {
                    drop(_cs);
                    self.signal_one(ObjectRef::new(ObjectClass::Queue, queue as u8), Ok(()), |k| {
                        k.queues[queue].dec_blocked()
                    });
                    return Ok(value);
                }
                if !suspend.is_yes() {
                    return Err(Error::QueueEmpty);
                }
                self.queues[queue].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Queue, queue as u8))?;
        }
    }

    pub fn queue_reset(&mut self, queue: usize) -> KernResult<()> {
        check_index(queue, NQUEUES, Error::InvalidQueue)?;
        {
            let _cs = CriticalSection::enter();
            self.queues[queue].clear();
        }
        self.signal_all(
            ObjectRef::new(ObjectClass::Queue, queue as u8),
            Err(Error::QueueWasReset),
            |k| k.queues[queue].dec_blocked(),
        );
        Ok(())
    }

    // ---- pipes (component 4.6) ----

    pub fn pipe_send(&mut self, pipe: usize, message: &[u8], suspend: Suspend) -> KernResult<()> {
        check_index(pipe, NPIPES, Error::InvalidPipe)?;
        self.pipes[pipe].check_size(message.len())?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.pipes[pipe].try_send(message) {
                    drop(_cs);
                    self.signal_one(ObjectRef::new(ObjectClass::Pipe, pipe as u8), Ok(()), |k| {
                        k.pipes[pipe].dec_blocked()
                    });
                    return Ok(());
                }
                if !suspend.is_yes() {
                    return Err(Error::PipeFull);
                }
                self.pipes[pipe].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Pipe, pipe as u8))?;
        }
    }

    pub fn pipe_receive(&mut self, pipe: usize, out: &mut [u8], suspend: Suspend) -> KernResult<usize> {
        check_index(pipe, NPIPES, Error::InvalidPipe)?;
        self.pipes[pipe].check_size(out.len())?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.pipes[pipe].try_receive(out) {
                    drop(_cs);
                    self.signal_one(ObjectRef::new(ObjectClass::Pipe, pipe as u8), Ok(()), |k| {
                        k.pipes[pipe].dec_blocked()
                    });
                    return Ok(out.len());
                }
                if !suspend.is_yes() {
                    return Err(Error::PipeEmpty);
                }
                self.pipes[pipe].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Pipe, pipe as u8))?;
        }
    }

    pub fn pipe_reset(&mut self, pipe: usize) -> KernResult<()> {
        check_index(pipe, NPIPES, Error::InvalidPipe)?;
        {
            let _cs = CriticalSection::enter();
            self.pipes[pipe].clear();
        }
        self.signal_all(
            ObjectRef::new(ObjectClass::Pipe, pipe as u8),
            Err(Error::PipeWasReset),
            |k| k.pipes[pipe].dec_blocked(),
        );
        Ok(())
    }

    // ---- semaphores (component 4.7) ----

    pub fn semaphore_obtain(&mut self, sem: usize, suspend: Suspend) -> KernResult<()> {
        check_index(sem, NSEMAPHORES, Error::InvalidSemaphore)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if self.semaphores[sem].try_obtain() {
                    return Ok(());
                }
                if !suspend.is_yes() {
                    return Err(Error::Unavailable);
                }
                self.semaphores[sem].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::Semaphore, sem as u8))?;
        }
    }

    pub fn semaphore_release(&mut self, sem: usize) -> KernResult<()> {
        check_index(sem, NSEMAPHORES, Error::InvalidSemaphore)?;
        {
            let _cs = CriticalSection::enter();
            if !self.semaphores[sem].try_release() {
                return Err(Error::Unavailable);
            }
        }
        self.signal_one(ObjectRef::new(ObjectClass::Semaphore, sem as u8), Ok(()), |k| {
            k.semaphores[sem].dec_blocked()
        });
        Ok(())
    }

    pub fn semaphore_reset(&mut self, sem: usize, initial: u8) -> KernResult<()> {
        check_index(sem, NSEMAPHORES, Error::InvalidSemaphore)?;
        {
            let _cs = CriticalSection::enter();
            self.semaphores[sem].reset_count(initial);
        }
        self.signal_all(
            ObjectRef::new(ObjectClass::Semaphore, sem as u8),
            Err(Error::SemaphoreWasReset),
            |k| k.semaphores[sem].dec_blocked(),
        );
        Ok(())
    }

    // ---- event groups (component 4.8) ----

    /// Applies `mask`/`op` to the group's flags, then wakes and lets every
    /// blocked waiter re-evaluate on its own (design notes open question 1):
    /// a set never checks what any particular waiter wanted, it just gives
    /// everybody a chance to recheck.
    pub fn event_group_set(&mut self, group: usize, mask: u8, op: EventOp) -> KernResult<()> {
        check_index(group, NEVENTGROUPS, Error::InvalidGroup)?;
        {
            let _cs = CriticalSection::enter();
            self.event_groups[group].apply(mask, op);
        }
        self.signal_all(
            ObjectRef::new(ObjectClass::EventGroup, group as u8),
            Ok(()),
            |k| k.event_groups[group].dec_blocked(),
        );
        Ok(())
    }

    pub fn event_group_retrieve(
        &mut self,
        group: usize,
        requested: u8,
        op: EventOp,
        suspend: Suspend,
    ) -> KernResult<u8> {
        check_index(group, NEVENTGROUPS, Error::InvalidGroup)?;
        if suspend.is_yes() && !S::BLOCKING_ALLOWED {
            return Err(Error::InvalidSuspend);
        }
        loop {
            {
                let _cs = CriticalSection::enter();
                if let Some(matched) = self.event_groups[group].evaluate(requested, op) {
                    return Ok(matched);
                }
                if !suspend.is_yes() {
                    return Err(Error::NotPresent);
                }
                self.event_groups[group].inc_blocked();
            }
            self.block_active(ObjectRef::new(ObjectClass::EventGroup, group as u8))?;
        }
    }

    // ---- timers (component 4.10) ----

    pub fn timer_control(&mut self, timer: usize, enable: TimerEnable) -> KernResult<()> {
        check_index(timer, NTIMERS, Error::InvalidTimer)?;
        let _cs = CriticalSection::enter();
        self.timers[timer].control(enable);
        Ok(())
    }

    pub fn timer_get_remaining(&self, timer: usize) -> KernResult<u32> {
        check_index(timer, NTIMERS, Error::InvalidTimer)?;
        Ok(self.timers[timer].remaining())
    }

    pub fn timer_reset(&mut self, timer: usize, enable: TimerEnable) -> KernResult<()> {
        check_index(timer, NTIMERS, Error::InvalidTimer)?;
        let _cs = CriticalSection::enter();
        self.timers[timer].reset(enable)
    }

    pub(crate) fn timers_mut(&mut self) -> &mut [Timer] {
        &mut self.timers
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub(crate) fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub(crate) fn slice_state(&mut self) -> (&mut u32, u32) {
        (&mut self.slice_remaining, self.slice_reload)
    }

    /// Lets [`crate::tick`] drive a reschedule without reaching past this
    /// module's privacy boundary into `switch_to_index` directly.
    pub(crate) fn force_reschedule(&mut self, hint: Hint) {
        let next = S::reschedule(self.active, &self.tasks, hint);
        self.switch_to_index(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PoolConfig, SemaphoreConfig, TaskConfig};
    use crate::sched::{Priority, RoundRobin};

    fn dummy() {}

    fn empty_round_robin<const NTASKS: usize>(
    ) -> Kernel<RoundRobin, NTASKS, 0, 0, 0, 0, 0, 0, 0> {
        Kernel::new(KernelConfig {
            tasks: array::from_fn(|_| TaskConfig::new(dummy, None)),
            pools: [],
            queues: [],
            pipes: [],
            semaphores: [],
            timers: [],
            time_slice_ticks: 0,
        })
    }

    #[test]
    fn start_picks_lowest_ready_task() {
        let mut k = empty_round_robin::<3>();
        assert_eq!(k.start(), 0);
    }

    #[test]
    fn suspended_autostart_is_skipped_at_boot() {
        let mut k: Kernel<RoundRobin, 2, 0, 0, 0, 0, 0, 0, 0> = Kernel::new(KernelConfig {
            tasks: [TaskConfig::new(dummy, None).suspended(), TaskConfig::new(dummy, None)],
            pools: [],
            queues: [],
            pipes: [],
            semaphores: [],
            timers: [],
            time_slice_ticks: 0,
        });
        assert_eq!(k.start(), 1);
    }

    #[test]
    fn relinquish_rotates_round_robin() {
        let mut k = empty_round_robin::<3>();
        k.start();
        assert_eq!(k.active_task(), 0);
        k.task_relinquish();
        assert_eq!(k.active_task(), 1);
        k.task_relinquish();
        assert_eq!(k.active_task(), 2);
        k.task_relinquish();
        assert_eq!(k.active_task(), 0);
    }

    #[test]
    fn resume_under_priority_preempts_a_lower_priority_active_task() {
        let mut k: Kernel<Priority, 2, 0, 0, 0, 0, 0, 0, 0> = Kernel::new(KernelConfig {
            tasks: [
                TaskConfig::new(dummy, None).suspended(),
                TaskConfig::new(dummy, None),
            ],
            pools: [],
            queues: [],
            pipes: [],
            semaphores: [],
            timers: [],
            time_slice_ticks: 0,
        });
        assert_eq!(k.start(), 1);
        k.task_resume(0).unwrap();
        assert_eq!(k.active_task(), 0, "task 0 outranks the active task 1 and must preempt");
    }

    #[test]
    fn task_suspend_and_resume_round_trip() {
        let mut k = empty_round_robin::<2>();
        k.start();
        assert_eq!(k.task_state(1).unwrap(), TaskState::Ready);
        k.task_suspend(1).unwrap();
        assert_eq!(k.task_state(1).unwrap(), TaskState::PureSuspended);
        assert_eq!(k.task_resume(1), Ok(()));
        assert_eq!(k.task_resume(1), Err(Error::InvalidResume));
    }

    #[test]
    fn out_of_range_task_index_is_rejected() {
        let k = empty_round_robin::<2>();
        assert_eq!(k.task_state(5), Err(Error::InvalidTask));
    }

    #[test]
    fn signals_send_and_receive_round_trip() {
        let mut k = empty_round_robin::<1>();
        k.start();
        k.signals_send(0, 0b0101).unwrap();
        assert_eq!(k.signals_receive(), 0b0101);
        assert_eq!(k.signals_receive(), 0);
    }

    fn one_pool_kernel(partitions: usize, size: usize) -> Kernel<RoundRobin, 1, 1, 0, 0, 0, 0, 0, 0> {
        let storage: &'static mut [u8] = Box::leak(vec![0u8; partitions * (1 + size)].into_boxed_slice());
        let mut k: Kernel<RoundRobin, 1, 1, 0, 0, 0, 0, 0, 0> = Kernel::new(KernelConfig {
            tasks: [TaskConfig::new(dummy, None)],
            pools: [PoolConfig { storage, partition_size: size }],
            queues: [],
            pipes: [],
            semaphores: [],
            timers: [],
            time_slice_ticks: 0,
        });
        k.start();
        k
    }

    #[test]
    fn partition_allocate_then_deallocate_then_reallocate() {
        let mut k = one_pool_kernel(1, 4);
        let ptr = k.partition_allocate(0, Suspend::No).unwrap();
        assert_eq!(k.partition_allocate(0, Suspend::No), Err(Error::NoPartition));
        k.partition_deallocate(ptr).unwrap();
        assert!(k.partition_allocate(0, Suspend::No).is_ok());
    }

    #[test]
    fn double_deallocate_is_rejected() {
        let mut k = one_pool_kernel(1, 4);
        let ptr = k.partition_allocate(0, Suspend::No).unwrap();
        k.partition_deallocate(ptr).unwrap();
        assert_eq!(k.partition_deallocate(ptr), Err(Error::InvalidPointer));
    }

    #[test]
    fn mailbox_send_then_receive_round_trips() {
        let mut k: Kernel<RoundRobin, 1, 0, 1, 0, 0, 0, 0, 0> = Kernel::new(KernelConfig {
            tasks: [TaskConfig::new(dummy, None)],
            pools: [],
            queues: [],
            pipes: [],
            semaphores: [],
            timers: [],
            time_slice_ticks: 0,
        });
        k.start();
        k.mailbox_send(0, 99, Suspend::No).unwrap();
        assert_eq!(k.mailbox_send(0, 1, Suspend::No), Err(Error::MailboxFull));
        assert_eq!(k.mailbox_receive(0, Suspend::No), Ok(99));
        assert_eq!(k.mailbox_receive(0, Suspend::No), Err(Error::MailboxEmpty));
    }

    /// Exercises the genuinely-blocking contract directly: this manually
    /// places a task in `Waiting` on a semaphore (as `block_active` would,
    /// absent a second real thread of execution to make that happen from
    /// the public API on the single-threaded simulator backend), then
    /// checks that `semaphore_reset` drains every waiter with the
    /// documented error and clears the blocked count to zero.
    #[test]
    fn semaphore_reset_drains_every_blocked_waiter() {
        let mut k: Kernel<RoundRobin, 4, 0, 0, 0, 0, 1, 0, 0> = Kernel::new(KernelConfig {
            tasks: array::from_fn(|_| TaskConfig::new(dummy, None).suspended()),
            pools: [],
            queues: [],
            pipes: [],
            semaphores: [SemaphoreConfig { initial: 0 }],
            timers: [],
            time_slice_ticks: 0,
        });
        let obj = ObjectRef::new(ObjectClass::Semaphore, 0);
        for waiter in [0usize, 1, 2] {
            k.tasks_mut()[waiter].state = TaskState::Waiting(obj);
            k.semaphores[0].inc_blocked();
        }
        assert_eq!(k.semaphores[0].blocked_count(), 3);

        k.semaphore_reset(0, 0).unwrap();

        assert_eq!(k.semaphores[0].blocked_count(), 0);
        for waiter in [0usize, 1, 2] {
            assert!(k.task_state(waiter).unwrap().is_ready());
        }
        assert_eq!(k.tasks[3].state, TaskState::PureSuspended);
    }

    /// Same technique for event groups: a waiter parked on a retrieve that
    /// wasn't satisfiable re-evaluates on every `event_group_set`, per
    /// design notes open question 1, rather than being told directly
    /// whether its particular request was met.
    #[test]
    fn event_group_set_wakes_a_waiter_to_recheck() {
        let mut k: Kernel<RoundRobin, 2, 0, 0, 0, 0, 0, 1, 0> = Kernel::new(KernelConfig {
            tasks: [TaskConfig::new(dummy, None), TaskConfig::new(dummy, None).suspended()],
            pools: [],
            queues: [],
            pipes: [],
            semaphores: [],
            timers: [],
            time_slice_ticks: 0,
        });
        let obj = ObjectRef::new(ObjectClass::EventGroup, 0);
        k.tasks_mut()[1].state = TaskState::Waiting(obj);
        k.event_groups[0].inc_blocked();

        k.event_group_set(0, 0b0001, EventOp::Or).unwrap();

        assert!(k.task_state(1).unwrap().is_ready());
        assert_eq!(k.event_groups[0].blocked_count(), 0);
        assert_eq!(k.tasks[1].blocking_return, Ok(()));
        assert_eq!(k.event_groups[0].evaluate(0b0001, EventOp::Or), Some(0b0001));
    }

    #[test]
    fn task_reset_while_waiting_reports_invalid_task_and_clears_blocked_count() {
        let mut k: Kernel<RoundRobin, 2, 0, 1, 0, 0, 0, 0, 0> = Kernel::new(KernelConfig {
            tasks: [TaskConfig::new(dummy, None), TaskConfig::new(dummy, None).suspended()],
            pools: [],
            queues: [],
            pipes: [],
            semaphores: [],
            timers: [],
            time_slice_ticks: 0,
        });
        let obj = ObjectRef::new(ObjectClass::Mailbox, 0);
        k.tasks_mut()[1].state = TaskState::Waiting(obj);
        k.mailboxes[0].inc_blocked();

        k.task_reset(1).unwrap();

        assert_eq!(k.task_state(1).unwrap(), TaskState::PureSuspended);
        assert_eq!(k.mailboxes[0].blocked_count(), 0);
        assert_eq!(k.tasks[1].blocking_return, Err(Error::InvalidTask));
    }
}
