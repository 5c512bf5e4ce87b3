//! Architecture abstraction layer.
//!
//! Exactly one backend is active in a given build: [`arm_m`] on a bare-metal
//! Cortex-M target, [`simulator`] everywhere else — which includes every
//! host `cargo test` run. Both backends implement the same small surface: a
//! critical-section primitive ([`CriticalSection`]), a context-swap
//! primitive ([`SavedState`] plus [`switch_to`]), and a logger installer.
//! The kernel body above this module never reaches past it to touch a
//! register directly; per the design note on inline assembly, a context
//! swap is treated as an external primitive with a contract ("save the
//! active task's registers and stack pointer, restore the next task's, and
//! return into it"), not as something kernel logic inspects.

use core::sync::atomic::{AtomicU8, Ordering};

use abi::ExecutionContext;

use crate::task::Task;

cfg_if::cfg_if! {
    if #[cfg(target_os = "none")] {
        mod arm_m;
        pub use arm_m::{SavedState, switch_to, install_logger};
    } else {
        mod simulator;
        pub use simulator::{SavedState, switch_to, install_logger};
    }
}

/// The live execution-context variable (component 3: "current execution
/// context"). Genuinely global rather than a `Kernel` field — a single image
/// has exactly one CPU and one notion of "what is running right now",
/// independent of which `Kernel` instance, if any, is active. Starts at
/// `Startup` and is expected to reach `Task` exactly once, from
/// [`crate::kernel::Kernel::start`], and never leave it again except for the
/// brief `ManagedIsr` window each [`crate::kernel::Kernel::tick`] opens and
/// closes around itself.
static EXECUTION_CONTEXT: AtomicU8 = AtomicU8::new(ExecutionContext::Startup as u8);

fn context_from_u8(raw: u8) -> ExecutionContext {
    match raw {
        x if x == ExecutionContext::Task as u8 => ExecutionContext::Task,
        x if x == ExecutionContext::Startup as u8 => ExecutionContext::Startup,
        x if x == ExecutionContext::NativeIsr as u8 => ExecutionContext::NativeIsr,
        _ => ExecutionContext::ManagedIsr,
    }
}

/// Reads the current execution context.
pub(crate) fn execution_context() -> ExecutionContext {
    context_from_u8(EXECUTION_CONTEXT.load(Ordering::Relaxed))
}

/// Sets the execution context, returning whatever it was before. Used around
/// every transition the in-scope code actually drives: task dispatch
/// (`Startup` -> `Task`) and the tick handler's `ManagedIsr` window. Native-ISR
/// entry/exit has no counterpart here — the trap glue that would call it is
/// out of scope — so `NativeIsr` is reachable in the type but never actually
/// set by this crate.
pub(crate) fn set_execution_context(ctx: ExecutionContext) -> ExecutionContext {
    context_from_u8(EXECUTION_CONTEXT.swap(ctx as u8, Ordering::Relaxed))
}

/// RAII guard marking the `ManagedIsr` window around the tick handler.
/// Restores whatever context was active before it on drop, rather than
/// assuming `Task`, so a tick that (somehow) ran during another ISR doesn't
/// clobber that ISR's context on the way out.
pub(crate) struct ManagedIsrGuard(ExecutionContext);

impl ManagedIsrGuard {
    pub(crate) fn enter() -> Self {
        ManagedIsrGuard(set_execution_context(ExecutionContext::ManagedIsr))
    }
}

impl Drop for ManagedIsrGuard {
    fn drop(&mut self) {
        set_execution_context(self.0);
    }
}

/// Logs a message from kernel context through the `log` facade.
///
/// This is a thin wrapper rather than a raw re-export so that call sites in
/// the rest of the kernel read `klog::debug!(...)` uniformly regardless of
/// which backend ends up installed.
pub mod klog {
    pub use log::{debug, error, info, trace, warn};
}

/// RAII guard produced by [`CriticalSection::enter`]. Mutation of shared
/// kernel state from task context must only happen while one of these is
/// alive.
pub struct CriticalSection {
    masked: bool,
}

impl CriticalSection {
    /// Enters a critical section, suppressing interrupts if (and only if)
    /// the current execution context is a task. From interrupt context this
    /// is a no-op: the hardware has already masked interrupts around the
    /// handler, so there is nothing further to suppress, and nesting would
    /// otherwise be required where the kernel never needs it.
    pub fn enter() -> Self {
        let masked = matches!(execution_context(), ExecutionContext::Task);
        if masked {
            imp::cs_enter();
        }
        CriticalSection { masked }
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        if self.masked {
            imp::cs_exit();
        }
    }
}


#[cfg(target_os = "none")]
use arm_m as imp;
#[cfg(not(target_os = "none"))]
use simulator as imp;

/// Performs a context swap from `from` to `to`.
///
/// # Safety
///
/// Both tasks' saved state must be consistent with their configured stacks.
/// This function does not return to its caller in the usual sense: control
/// returns into `to`'s next instruction, which might be here, might not be,
/// depending on history.
pub unsafe fn switch_context(from: &mut Task, to: &mut Task) {
    switch_to(from, to)
}
