//! Kernel ABI definitions, shared between the kernel and application tasks.
//!
//! Every kernel object lives in a fixed-size table declared at build time;
//! there is no dynamic object creation. An `ObjectRef` is the only handle a
//! task ever holds to an object outside its own index-based argument.

#![no_std]

/// Hard ceiling on the number of instances of any one object class (tasks,
/// partition pools, mailboxes, queues, pipes, semaphores, event groups,
/// timers). Chosen to fit an object index in a nibble.
pub const MAX_OBJECTS: usize = 16;

/// The kinds of object a task can block against. `Task` itself never appears
/// here; task-to-task suspension (`task_suspend`/`task_resume`) is tracked
/// separately from object waits.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ObjectClass {
    PartitionPool,
    Mailbox,
    Queue,
    Pipe,
    Semaphore,
    EventGroup,
    Timer,
}

/// Names a specific object: its class, plus its index within that class's
/// table. Used to tag a blocked task with exactly what it is waiting on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ObjectRef {
    pub class: ObjectClass,
    pub index: u8,
}

impl ObjectRef {
    pub const fn new(class: ObjectClass, index: u8) -> Self {
        Self { class, index }
    }
}

/// Whether a blocking-capable call should suspend the caller when the
/// operation cannot complete immediately. Replaces the magic
/// `NO_SUSPEND`/`SUSPEND` sentinel values of the call surface this models
/// with a type that can't hold a third, invalid value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Suspend {
    No,
    Yes,
}

impl Suspend {
    pub fn is_yes(self) -> bool {
        matches!(self, Suspend::Yes)
    }
}

/// Operation applied by `event_group_set`/`event_group_retrieve`. Only the
/// two non-consuming forms are representable; the "consume" variants of the
/// call surface this models are not implemented, so there is no value here
/// that could produce `Error::InvalidOperation` at the type level - callers
/// simply cannot construct one.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventOp {
    Or,
    And,
}

/// Requested state for `timer_control`/`timer_reset`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TimerEnable {
    Enable,
    Disable,
}

/// Selects which critical-section and reschedule behavior is in effect.
/// Updated on every interrupt entry/exit; the kernel consults it before
/// deciding whether `cs_enter` needs to mask interrupts and whether a
/// reschedule can swap context inline or must defer to the ISR epilogue.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ExecutionContext {
    /// Running ordinary task code.
    Task,
    /// Between reset and the first task dispatch.
    Startup,
    /// A hardware interrupt handler that does not interact with scheduling.
    NativeIsr,
    /// The tick interrupt, or any other ISR that may alter scheduling
    /// decisions and is therefore exempt from the `cs_enter` no-op rule
    /// that applies to `NativeIsr`.
    ManagedIsr,
}

/// Error kinds returned by service calls. A successful call returns its
/// result through `Ok`; there is no separate "success" variant here the way
/// the call surface this models used return code zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A task index was outside the configured task table.
    InvalidTask,
    /// `task_resume` was called against a task that was not purely
    /// suspended.
    InvalidResume,
    /// A suspend argument was neither `Suspend::No` nor, when blocking is
    /// compiled in, `Suspend::Yes`.
    InvalidSuspend,
    /// A partition pool index was outside the configured pool table.
    InvalidPool,
    /// A pointer argument was null or did not point just past a valid,
    /// in-use partition header.
    InvalidPointer,
    /// A partition pool had no free partition and the caller did not ask to
    /// block.
    NoPartition,
    /// A mailbox index was outside the configured mailbox table.
    InvalidMailbox,
    /// `mailbox_receive` found no message and the caller did not ask to
    /// block.
    MailboxEmpty,
    /// `mailbox_send` found the mailbox occupied and the caller did not ask
    /// to block.
    MailboxFull,
    /// The caller was blocked on a mailbox that was reset.
    MailboxWasReset,
    /// A queue index was outside the configured queue table.
    InvalidQueue,
    /// A pipe message did not match the pipe's configured message size.
    InvalidSize,
    /// `queue_receive` found the queue empty and the caller did not ask to
    /// block.
    QueueEmpty,
    /// `queue_send`/`queue_jam` found the queue full and the caller did not
    /// ask to block.
    QueueFull,
    /// The caller was blocked on a queue that was reset.
    QueueWasReset,
    /// A pipe index was outside the configured pipe table.
    InvalidPipe,
    /// `pipe_receive` found the pipe empty and the caller did not ask to
    /// block.
    PipeEmpty,
    /// `pipe_send` found the pipe full and the caller did not ask to block.
    PipeFull,
    /// The caller was blocked on a pipe that was reset.
    PipeWasReset,
    /// A semaphore index was outside the configured semaphore table.
    InvalidSemaphore,
    /// The caller was blocked on a semaphore that was reset.
    SemaphoreWasReset,
    /// `semaphore_obtain` found the counter at zero, or `semaphore_release`
    /// found it at its ceiling, and the caller did not ask to block (obtain)
    /// or blocking does not apply (release).
    Unavailable,
    /// An event group index was outside the configured event group table.
    InvalidGroup,
    /// An event group operation was neither `EventOp::Or` nor
    /// `EventOp::And`.
    InvalidOperation,
    /// `event_group_retrieve` did not find its requested bits present and
    /// the caller did not ask to block.
    NotPresent,
    /// A timer index was outside the configured timer table.
    InvalidTimer,
    /// A `TimerEnable` argument was invalid.
    InvalidEnable,
    /// `timer_reset` was called against a timer that was still running.
    NotDisabled,
}

pub type KernResult<T> = Result<T, Error>;

/// Build-identification string, baked in at link time. Trivial but stable:
/// application code reads this to confirm which kernel image it is running
/// against.
pub const RELEASE_INFO: &str = concat!(
    "kernel ",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_NAME"),
    ")",
);
