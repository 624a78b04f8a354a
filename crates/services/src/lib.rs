#![forbid(unsafe_code)]

pub mod error;
pub mod review_service;
pub mod sessions;

pub use study_core::Clock;
pub use sessions as session;

pub use error::{ReviewServiceError, StudyError};
pub use review_service::ReviewService;

pub use sessions::{DeckOverview, OverviewReport, StudySession};
