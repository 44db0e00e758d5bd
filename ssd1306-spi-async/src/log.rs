//! Logging shims. Each macro forwards to `defmt` and/or `log`, depending on which features are
//! enabled, and compiles to nothing when neither is.

macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::$level!($($arg)*);

        #[cfg(feature = "log")]
        log::$level!($($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log::log_at!(debug, $($arg)*)
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log::log_at!(trace, $($arg)*)
    };
}

macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::log::log_at!(warn, $($arg)*)
    };
}

macro_rules! debug_assert {
    ($assertion:expr, $message:literal $(, $arg:expr)* $(,)?) => {
        #[cfg(feature = "defmt")]
        defmt::debug_assert!($assertion, $message $(, $arg)*);

        #[cfg(not(feature = "defmt"))]
        core::debug_assert!($assertion, $message $(, $arg)*);
    };
}

pub(crate) use {debug, debug_assert, log_at, trace, warn_log};
