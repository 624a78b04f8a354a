mod overview;
mod study;

// Public API of the session subsystem.
pub use crate::error::StudyError;
pub use overview::{DeckOverview, OverviewReport};
pub use study::StudySession;
pub use study_core::model::SessionProgress;
