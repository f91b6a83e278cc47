mod duration;
mod serde_impl;

#[cfg(feature = "chrono")]
mod chrono_impl;

#[cfg(feature = "jiff")]
mod jiff_impl;

pub use duration::*;
