//! Common error-handling support.
//!
//! Every service call in this crate returns `abi::KernResult<T>`; there is
//! no panic-based control flow on the request path. What remains here is
//! the handling of *internal* invariant violations — conditions accounting
//! bugs in the kernel itself would produce, never conditions a caller can
//! trigger. Per the error-handling design, these are not defensively
//! reported in a release build: the kernel trusts its own accounting and
//! pays nothing to double-check it. In a debug build (and in every host
//! test) [`kinvariant`] still catches a violation immediately, at the point
//! it happened, rather than silently producing a corrupted answer three
//! calls later.

/// Checks a kernel-internal invariant. Panics in debug builds (including
/// host tests); compiles to nothing in release, per the "internal
/// invariant violations are not defensively reported" policy.
#[macro_export]
macro_rules! kinvariant {
    ($cond:expr) => {
        debug_assert!($cond, "kernel invariant violated: {}", stringify!($cond));
    };
    ($cond:expr, $($arg:tt)+) => {
        debug_assert!($cond, $($arg)+);
    };
}
