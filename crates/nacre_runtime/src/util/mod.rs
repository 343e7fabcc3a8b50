pub mod capabilities;
pub(crate) mod helpers;

pub use capabilities::{Capabilities, Clock, RngAlgorithm, SystemClock};
pub use helpers::Appendable;
