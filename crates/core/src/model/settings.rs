use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("fail multiplier must be finite and >= 1, got {0}")]
    InvalidFailMult(f64),

    #[error("fail increment must be finite and >= 0, got {0}")]
    InvalidFailAdd(f64),

    #[error("fail cap must be finite and >= 1, got {0}")]
    InvalidFailMax(f64),

    #[error("pass decay must be in [0, 1), got {0}")]
    InvalidPassDecay(f64),

    #[error("coverage boost must be finite and > 0, got {0}")]
    InvalidCoverageBoost(f64),

    #[error("same-card penalty must be in (0, 1], got {0}")]
    InvalidSameCardPenalty(f64),

    #[error("age boost cap must be finite and >= 0, got {0}")]
    InvalidAgeBoostMax(f64),

    #[error("relearn delay must be > 0 ms")]
    InvalidRelearnDelay,

    #[error("maximum interval must be at least 7 days, got {0}")]
    InvalidMaxIntervalDays(u32),

    #[error("due estimate threshold must be finite and >= 1, got {0}")]
    InvalidDueThreshold(f64),
}

//
// ─── DEFAULTS ──────────────────────────────────────────────────────────────────
//

pub const DEFAULT_FAIL_MULT: f64 = 1.8;
pub const DEFAULT_FAIL_ADD: f64 = 1.0;
pub const DEFAULT_FAIL_MAX: f64 = 12.0;
pub const DEFAULT_PASS_DECAY: f64 = 0.55;
pub const DEFAULT_COVERAGE_BOOST: f64 = 2.5;
pub const DEFAULT_SAME_CARD_PENALTY: f64 = 0.05;
pub const DEFAULT_AGE_BOOST_MAX: f64 = 2.0;
/// Short relearn window after a fail (10 minutes).
pub const DEFAULT_RELEARN_DELAY_MS: i64 = 10 * 60 * 1000;
pub const DEFAULT_MAX_INTERVAL_DAYS: u32 = 60;
pub const DEFAULT_DUE_ESTIMATE_THRESHOLD: f64 = 1.2;

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tuning knobs for the weight model, sampler and tone scheduler.
///
/// Build one from a `StudySettingsDraft` via `validate()`, or use
/// `StudySettings::default()` for the stock constants.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySettings {
    fail_mult: f64,
    fail_add: f64,
    fail_max: f64,
    pass_decay: f64,
    coverage_boost: f64,
    same_card_penalty: f64,
    age_boost_max: f64,
    relearn_delay_ms: i64,
    max_interval_days: u32,
    due_estimate_threshold: f64,
}

/// Unvalidated settings, e.g. as read from a config source.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySettingsDraft {
    pub fail_mult: f64,
    pub fail_add: f64,
    pub fail_max: f64,
    pub pass_decay: f64,
    pub coverage_boost: f64,
    pub same_card_penalty: f64,
    pub age_boost_max: f64,
    pub relearn_delay_ms: i64,
    pub max_interval_days: u32,
    pub due_estimate_threshold: f64,
}

impl Default for StudySettingsDraft {
    fn default() -> Self {
        Self {
            fail_mult: DEFAULT_FAIL_MULT,
            fail_add: DEFAULT_FAIL_ADD,
            fail_max: DEFAULT_FAIL_MAX,
            pass_decay: DEFAULT_PASS_DECAY,
            coverage_boost: DEFAULT_COVERAGE_BOOST,
            same_card_penalty: DEFAULT_SAME_CARD_PENALTY,
            age_boost_max: DEFAULT_AGE_BOOST_MAX,
            relearn_delay_ms: DEFAULT_RELEARN_DELAY_MS,
            max_interval_days: DEFAULT_MAX_INTERVAL_DAYS,
            due_estimate_threshold: DEFAULT_DUE_ESTIMATE_THRESHOLD,
        }
    }
}

impl StudySettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into usable settings.
    ///
    /// # Errors
    ///
    /// Returns the first `SettingsError` encountered. Bounds keep the weight
    /// invariant (>= 1) and the interval ladder (1, 3, 7, ...) meaningful.
    pub fn validate(self) -> Result<StudySettings, SettingsError> {
        if !self.fail_mult.is_finite() || self.fail_mult < 1.0 {
            return Err(SettingsError::InvalidFailMult(self.fail_mult));
        }
        if !self.fail_add.is_finite() || self.fail_add < 0.0 {
            return Err(SettingsError::InvalidFailAdd(self.fail_add));
        }
        if !self.fail_max.is_finite() || self.fail_max < 1.0 {
            return Err(SettingsError::InvalidFailMax(self.fail_max));
        }
        if !(0.0..1.0).contains(&self.pass_decay) {
            return Err(SettingsError::InvalidPassDecay(self.pass_decay));
        }
        if !self.coverage_boost.is_finite() || self.coverage_boost <= 0.0 {
            return Err(SettingsError::InvalidCoverageBoost(self.coverage_boost));
        }
        if !(self.same_card_penalty > 0.0 && self.same_card_penalty <= 1.0) {
            return Err(SettingsError::InvalidSameCardPenalty(
                self.same_card_penalty,
            ));
        }
        if !self.age_boost_max.is_finite() || self.age_boost_max < 0.0 {
            return Err(SettingsError::InvalidAgeBoostMax(self.age_boost_max));
        }
        if self.relearn_delay_ms <= 0 {
            return Err(SettingsError::InvalidRelearnDelay);
        }
        if self.max_interval_days < 7 {
            return Err(SettingsError::InvalidMaxIntervalDays(
                self.max_interval_days,
            ));
        }
        if !self.due_estimate_threshold.is_finite() || self.due_estimate_threshold < 1.0 {
            return Err(SettingsError::InvalidDueThreshold(
                self.due_estimate_threshold,
            ));
        }

        Ok(StudySettings {
            fail_mult: self.fail_mult,
            fail_add: self.fail_add,
            fail_max: self.fail_max,
            pass_decay: self.pass_decay,
            coverage_boost: self.coverage_boost,
            same_card_penalty: self.same_card_penalty,
            age_boost_max: self.age_boost_max,
            relearn_delay_ms: self.relearn_delay_ms,
            max_interval_days: self.max_interval_days,
            due_estimate_threshold: self.due_estimate_threshold,
        })
    }
}

impl Default for StudySettings {
    fn default() -> Self {
        let d = StudySettingsDraft::default();
        Self {
            fail_mult: d.fail_mult,
            fail_add: d.fail_add,
            fail_max: d.fail_max,
            pass_decay: d.pass_decay,
            coverage_boost: d.coverage_boost,
            same_card_penalty: d.same_card_penalty,
            age_boost_max: d.age_boost_max,
            relearn_delay_ms: d.relearn_delay_ms,
            max_interval_days: d.max_interval_days,
            due_estimate_threshold: d.due_estimate_threshold,
        }
    }
}

impl StudySettings {
    /// Returns a draft pre-filled with these values, for tweaking.
    #[must_use]
    pub fn to_draft(&self) -> StudySettingsDraft {
        StudySettingsDraft {
            fail_mult: self.fail_mult,
            fail_add: self.fail_add,
            fail_max: self.fail_max,
            pass_decay: self.pass_decay,
            coverage_boost: self.coverage_boost,
            same_card_penalty: self.same_card_penalty,
            age_boost_max: self.age_boost_max,
            relearn_delay_ms: self.relearn_delay_ms,
            max_interval_days: self.max_interval_days,
            due_estimate_threshold: self.due_estimate_threshold,
        }
    }

    // Accessors
    #[must_use]
    pub fn fail_mult(&self) -> f64 {
        self.fail_mult
    }

    #[must_use]
    pub fn fail_add(&self) -> f64 {
        self.fail_add
    }

    #[must_use]
    pub fn fail_max(&self) -> f64 {
        self.fail_max
    }

    #[must_use]
    pub fn pass_decay(&self) -> f64 {
        self.pass_decay
    }

    #[must_use]
    pub fn coverage_boost(&self) -> f64 {
        self.coverage_boost
    }

    #[must_use]
    pub fn same_card_penalty(&self) -> f64 {
        self.same_card_penalty
    }

    /// Cap on the age boost; reached after this many minutes unseen.
    #[must_use]
    pub fn age_boost_max(&self) -> f64 {
        self.age_boost_max
    }

    #[must_use]
    pub fn relearn_delay_ms(&self) -> i64 {
        self.relearn_delay_ms
    }

    #[must_use]
    pub fn max_interval_days(&self) -> u32 {
        self.max_interval_days
    }

    /// Weight above which a seen card is counted as "likely due".
    #[must_use]
    pub fn due_estimate_threshold(&self) -> f64 {
        self.due_estimate_threshold
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
