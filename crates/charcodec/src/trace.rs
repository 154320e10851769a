//! Internal logging shims.
//!
//! With the `tracing` feature these macros forward to [`tracing`]; without it
//! they expand to nothing, so call sites never carry `#[cfg]` attributes.

// Only one side of each cfg pair is active at a time.
#![allow(unused_macros)]

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($tt:tt)*) => { ::tracing::trace!($($tt)*) }
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($tt:tt)*) => { ::tracing::debug!($($tt)*) }
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}
