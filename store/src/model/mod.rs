mod course;
mod doc;
mod progress;
mod stats;
mod user;
mod verification;

pub use course::*;
pub use doc::*;
pub use progress::*;
pub use stats::*;
pub use user::*;
pub use verification::*;
