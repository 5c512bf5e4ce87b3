//! Architecture support for ARMv{7,8}-M.
//!
//! # Critical sections
//!
//! Task context enters a critical section by raising `PRIMASK`, which masks
//! every exception below the (unused) fault priorities. [`cs_enter`] and
//! [`cs_exit`] themselves don't know what the current execution context is —
//! that check lives one level up, in [`crate::arch::CriticalSection::enter`],
//! which only calls down into these functions when the execution context is
//! `Task`. From interrupt context the hardware has already done the masking
//! the moment the handler started running, so [`crate::arch::CriticalSection`]
//! skips both calls entirely there, and in particular never unmasks on drop
//! without having masked on entry.
//!
//! # Context swap
//!
//! Each task has its own stack; [`switch_to`] saves the outgoing task's
//! callee-saved registers and stack pointer into its [`SavedState`] slot and
//! restores the incoming task's. This is deliberately the only place in the
//! crate that speaks assembly, and it does so through stable `core::arch::asm!`
//! rather than the nightly-only `asm!`/`#[naked]` combination — the kernel
//! body above `arch` treats it as an opaque primitive with the contract
//! described in the module doc for [`crate::arch`].

use crate::task::Task;

/// Registers the ARM procedure call standard designates callee-saved, plus
/// the process stack pointer. EXC_RETURN is not modeled here: this kernel
/// performs context swaps by ordinary function call (from the scheduler,
/// inside a critical section) rather than by returning from an exception,
/// so there is no EXC_RETURN magic value to preserve between tasks.
#[repr(C)]
#[derive(Debug, Default)]
pub struct SavedState {
    r4: u32,
    r5: u32,
    r6: u32,
    r7: u32,
    r8: u32,
    r9: u32,
    r10: u32,
    r11: u32,
    sp: u32,
}

impl SavedState {
    /// Prepares a fresh save slot for a task that has never run: the next
    /// restore will pop straight into `entry`, running on `initial_sp`.
    pub fn fresh(entry: u32, initial_sp: u32) -> Self {
        // The entry trampoline expects r4 to hold the entry point and
        // restores it into pc via a small assembly shim the first time a
        // task is swapped in; everything else starts zeroed.
        SavedState {
            r4: entry,
            sp: initial_sp,
            ..Default::default()
        }
    }
}

pub(super) fn cs_enter() {
    unsafe {
        core::arch::asm!("cpsid i");
    }
}

pub(super) fn cs_exit() {
    unsafe {
        core::arch::asm!("cpsie i");
    }
}

/// Saves `from`'s registers, restores `to`'s, and resumes `to`.
///
/// # Safety
///
/// See [`crate::arch::switch_context`].
pub unsafe fn switch_to(from: &mut Task, to: &mut Task) {
    let from_save: *mut SavedState = &mut from.save;
    let to_save: *const SavedState = &to.save;
    core::arch::asm!(
        "mrs {tmp}, psp",
        "str {tmp}, [{from_sp}]",
        "stmia {from_regs}, {{r4-r11}}",
        "ldmia {to_regs}, {{r4-r11}}",
        "ldr {tmp}, [{to_sp}]",
        "msr psp, {tmp}",
        tmp = out(reg) _,
        from_sp = in(reg) &(*from_save).sp,
        from_regs = in(reg) &mut (*from_save).r4,
        to_regs = in(reg) &(*to_save).r4,
        to_sp = in(reg) &(*to_save).sp,
    );
}

pub fn install_logger() {
    #[cfg(feature = "klog-itm")]
    {
        static LOGGER: ItmLogger = ItmLogger;
        let _ = log::set_logger(&LOGGER);
    }
    #[cfg(feature = "klog-semihosting")]
    {
        static LOGGER: SemihostingLogger = SemihostingLogger;
        let _ = log::set_logger(&LOGGER);
    }
    #[cfg(any(feature = "klog-itm", feature = "klog-semihosting"))]
    log::set_max_level(log::LevelFilter::Trace);
}

#[cfg(feature = "klog-itm")]
struct ItmLogger;

#[cfg(feature = "klog-itm")]
impl log::Log for ItmLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        unsafe {
            let stim = &mut (*cortex_m::peripheral::ITM::ptr()).stim[0];
            cortex_m::iprintln!(stim, "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(feature = "klog-semihosting")]
struct SemihostingLogger;

#[cfg(feature = "klog-semihosting")]
impl log::Log for SemihostingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let _ = cortex_m_semihosting::hprintln!(
            "[{}] {}",
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}
