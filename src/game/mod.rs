pub mod clock;
pub mod utils;

pub use utils::*;
