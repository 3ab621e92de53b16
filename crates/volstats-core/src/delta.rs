//! Windowed deltas over monotonically increasing counters.
//!
//! A counter that goes backwards between two samples is taken to have been
//! reset by a controller restart. The delta is then the final value, as if
//! the counter had been counting from zero, and the caller gets a flag so it
//! can annotate the report instead of failing.

use serde::{Deserialize, Serialize};

/// Counter types that can be differenced across a sampling window.
pub trait WindowCounter: Copy + PartialOrd {
    /// `self - earlier`, only called when `self >= earlier`.
    fn since(self, earlier: Self) -> Self;
}

impl WindowCounter for u64 {
    fn since(self, earlier: Self) -> Self {
        self - earlier
    }
}

/// Result of differencing one counter across the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterDelta<T> {
    pub value: T,
    /// True when the final sample was below the initial one.
    pub reset: bool,
}

impl<T: WindowCounter> CounterDelta<T> {
    /// Difference `final_value - initial`, applying the reset policy when the
    /// counter decreased.
    pub fn between(initial: T, final_value: T) -> Self {
        if final_value < initial {
            Self {
                value: final_value,
                reset: true,
            }
        } else {
            Self {
                value: final_value.since(initial),
                reset: false,
            }
        }
    }
}

/// Non-fatal annotation recording that a windowed counter went backwards.
/// Both samples are kept exactly as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterResetWarning {
    pub counter: String,
    pub initial: u64,
    #[serde(rename = "final")]
    pub final_value: u64,
}

impl std::fmt::Display for CounterResetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "counterReset: {} went from {} to {}",
            self.counter, self.initial, self.final_value
        )
    }
}
