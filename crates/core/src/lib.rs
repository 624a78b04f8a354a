#![forbid(unsafe_code)]

pub mod due;
pub mod error;
pub mod model;
pub mod review;
pub mod sampler;
pub mod scheduler;
pub mod session;
pub mod time;
pub mod weight;

pub use error::Error;
pub use review::{Reviewer, apply_review};
pub use sampler::Sampler;
pub use scheduler::{Scheduler, is_due};
pub use session::SessionTracker;
pub use time::Clock;
pub use weight::{WeightModel, get_weight};
