//! Release/build identification (component 2, item 8).
//!
//! Trivial by design: a single constant string baked in at link time so
//! application code can confirm which kernel image it is running against.
//! The heavy lifting (reading `CARGO_PKG_VERSION` etc.) lives in `abi`,
//! since that's also where application code links against it without
//! depending on the kernel crate itself.

pub use abi::RELEASE_INFO;

#[cfg(test)]
mod tests {
    #[test]
    fn release_info_starts_with_kernel() {
        assert!(super::RELEASE_INFO.starts_with("kernel "));
    }
}
