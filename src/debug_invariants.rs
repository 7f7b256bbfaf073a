//! Structural self-checks for plans and tables.
//!
//! Checks compile in for debug builds and for the `strict-invariants` or
//! `check-invariants` features; release builds skip them entirely.

use crate::gather_error::GatherError;

pub trait DebugInvariants {
    /// Panic on a violated invariant when checks are compiled in.
    fn debug_assert_invariants(&self);
    /// Check every structural invariant, reporting the first violation.
    fn validate_invariants(&self) -> Result<(), GatherError>;
}

/// Run a fallible check and panic with `context` on failure when checks are
/// compiled in.
#[macro_export]
macro_rules! debug_invariants {
    ($check:expr, $($context:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(err) = $check {
            panic!(concat!("broken invariant in ", $($context)*, ": {}"), err);
        }
    };
}
