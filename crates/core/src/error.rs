use thiserror::Error;

use crate::model::{CardError, GradeError, ParseIdError, SettingsError};

/// Umbrella error for callers that do not care which domain check failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Card(#[from] CardError),
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
