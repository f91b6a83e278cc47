// NOTE (@Techassi): Fixed in https://github.com/la10736/rstest/pull/244 but not
// yet released.
#[cfg(test)]
use rstest_reuse::{self};

mod api_version;
mod group;
mod level;
mod version;

pub use api_version::*;
pub use group::*;
pub use level::*;
pub use version::*;
