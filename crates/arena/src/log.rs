//! Feature-gated forwarding to `tracing`
//!
//! With the `logging` feature disabled every macro expands to nothing, so call
//! sites never need their own `#[cfg]` blocks.

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        ::tracing::trace!($($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        ::tracing::debug!($($arg)*);
    };
}

macro_rules! warning {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        ::tracing::warn!($($arg)*);
    };
}

pub(crate) use {debug, trace, warning};
