mod card;
mod ids;
mod progress;
mod review;
mod session;
mod settings;

pub use ids::{CardId, ParseIdError};

pub use card::{Card, CardError};
pub use progress::{ProgressMap, ProgressRecord};
pub use review::{Grade, GradeError};
pub use session::SessionProgress;
pub use settings::{SettingsError, StudySettings, StudySettingsDraft};
