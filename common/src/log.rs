//! Logging macros shared by every crate in the workspace.
//!
//! They forward to [`tracing`]; the terminal front end decides how each
//! level (and the `revmap::success` target) is rendered.

/// Target used for "something was found" messages.
pub const SUCCESS_TARGET: &str = "revmap::success";

/// Target used for raw, preformatted terminal lines.
pub const PRINT_TARGET: &str = "revmap::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "revmap::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}
