//! Build-time configuration layer (component 2, item 9; see also the
//! amended specification's ambient-stack section on configuration).
//!
//! The compile-time feature matrix this crate is built against is mostly
//! expressed as const generics on [`crate::kernel::Kernel`] itself — an
//! object class sized to zero becomes a zero-length array, and every
//! operation against it is unreachable code the optimizer deletes for
//! free. What can't be expressed as an array length (a pool's partition
//! size, a queue or pipe's capacity, a semaphore's initial value, a
//! timer's periods, a task's entry point and stack) is supplied at
//! `Kernel::new` time through the descriptor types in this module, typed
//! in place of the preprocessor-generated tables the build matrix this
//! design is patterned on would produce.

/// Describes one task for `Kernel::new`.
pub struct TaskConfig {
    pub entry: fn(),
    /// Backing storage for this task's stack. `None` under run-to-completion,
    /// where no task has its own stack.
    pub stack: Option<&'static mut [u8]>,
    /// Whether this task starts `Ready` (vs. `PureSuspended`) at boot.
    pub autostart: bool,
}

impl TaskConfig {
    pub const fn new(entry: fn(), stack: Option<&'static mut [u8]>) -> Self {
        TaskConfig {
            entry,
            stack,
            autostart: true,
        }
    }

    pub const fn suspended(mut self) -> Self {
        self.autostart = false;
        self
    }
}

/// Describes one partition pool: the backing bytes (sized
/// `(1 + partition_size) * partition_count`) and the size of a single
/// partition's usable payload, excluding the one-byte header.
pub struct PoolConfig {
    pub storage: &'static mut [u8],
    pub partition_size: usize,
}

/// Describes one queue: backing storage for `capacity` pointer-sized
/// entries.
pub struct QueueConfig {
    pub storage: &'static mut [usize],
}

/// Describes one pipe: backing storage for `capacity * message_size` bytes.
pub struct PipeConfig {
    pub storage: &'static mut [u8],
    pub message_size: usize,
}

/// Describes one semaphore's initial counter value (0..=255).
pub struct SemaphoreConfig {
    pub initial: u8,
}

/// Describes one timer's configured periods, in ticks, and its optional
/// expiration callback.
pub struct TimerConfig {
    pub initial: u32,
    pub reschedule: u32,
    pub callback: Option<(fn(usize), usize)>,
}

/// The complete configuration matrix (component 2, item 1) for one
/// `Kernel::new` call: every per-object runtime parameter that a const
/// generic can't express. Mailboxes and event groups carry no per-object
/// configuration beyond their count, which is a const generic on `Kernel`
/// itself, so they don't appear here.
pub struct KernelConfig<
    const NTASKS: usize,
    const NPOOLS: usize,
    const NQUEUES: usize,
    const NPIPES: usize,
    const NSEMAPHORES: usize,
    const NTIMERS: usize,
> {
    pub tasks: [TaskConfig; NTASKS],
    pub pools: [PoolConfig; NPOOLS],
    pub queues: [QueueConfig; NQUEUES],
    pub pipes: [PipeConfig; NPIPES],
    pub semaphores: [SemaphoreConfig; NSEMAPHORES],
    pub timers: [TimerConfig; NTIMERS],
    /// Reload value for the time-slice countdown (component 3, "time-slice
    /// remaining counter"). Ignored by every scheduler but
    /// [`crate::sched::TimeSlice`].
    pub time_slice_ticks: u32,
}
