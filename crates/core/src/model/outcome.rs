use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

//
// ─── GAME MODE ─────────────────────────────────────────────────────────────────
//

/// Game modes a session can be played in.
///
/// Unknown keys are kept verbatim in `Other` so that callers can round-trip
/// them; they earn the neutral multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum GameMode {
    #[default]
    Classic,
    TimeTrial,
    Lives,
    Exam,
    Duel,
    Marathon,
    Streak,
    Trivial,
    ByLevels,
    Other(String),
}

impl GameMode {
    pub const KNOWN: [GameMode; 9] = [
        GameMode::Classic,
        GameMode::TimeTrial,
        GameMode::Lives,
        GameMode::Exam,
        GameMode::Duel,
        GameMode::Marathon,
        GameMode::Streak,
        GameMode::Trivial,
        GameMode::ByLevels,
    ];

    /// Stable key used on the wire and in storage.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            GameMode::Classic => "classic",
            GameMode::TimeTrial => "time_trial",
            GameMode::Lives => "lives",
            GameMode::Exam => "exam",
            GameMode::Duel => "duel",
            GameMode::Marathon => "marathon",
            GameMode::Streak => "streak",
            GameMode::Trivial => "trivial",
            GameMode::ByLevels => "by_levels",
            GameMode::Other(key) => key.as_str(),
        }
    }

    /// Player-facing name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Classic => "Clásico",
            GameMode::TimeTrial => "Contrarreloj",
            GameMode::Lives => "Vidas",
            GameMode::Exam => "Examen",
            GameMode::Duel => "Duelo",
            GameMode::Marathon => "Maratón",
            GameMode::Streak => "Racha",
            GameMode::Trivial => "Trivial",
            GameMode::ByLevels => "Por Niveles",
            GameMode::Other(_) => "Desconocido",
        }
    }

    /// Reward multiplier in tenths (`15` means ×1.5).
    #[must_use]
    pub fn multiplier_tenths(&self) -> u32 {
        match self {
            GameMode::Classic | GameMode::Other(_) => 10,
            GameMode::TimeTrial => 12,
            GameMode::Lives | GameMode::ByLevels => 13,
            GameMode::Exam | GameMode::Streak => 14,
            GameMode::Duel => 15,
            GameMode::Marathon => 16,
            GameMode::Trivial => 11,
        }
    }
}

impl FromStr for GameMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "classic" => GameMode::Classic,
            "time_trial" => GameMode::TimeTrial,
            "lives" => GameMode::Lives,
            "exam" => GameMode::Exam,
            "duel" => GameMode::Duel,
            "marathon" => GameMode::Marathon,
            "streak" => GameMode::Streak,
            "trivial" => GameMode::Trivial,
            "by_levels" => GameMode::ByLevels,
            other => GameMode::Other(other.to_owned()),
        })
    }
}

impl From<String> for GameMode {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl From<GameMode> for String {
    fn from(value: GameMode) -> Self {
        value.key().to_owned()
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

//
// ─── SESSION OUTCOME ───────────────────────────────────────────────────────────
//

/// Result of a finished session, as fed to the reward calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub game_mode: GameMode,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub victory: bool,
    pub score: Option<i64>,
}

impl SessionOutcome {
    #[must_use]
    pub fn new(game_mode: GameMode, correct_answers: u32, total_questions: u32) -> Self {
        Self {
            game_mode,
            correct_answers,
            total_questions,
            victory: false,
            score: None,
        }
    }

    #[must_use]
    pub fn with_victory(mut self, victory: bool) -> Self {
        self.victory = victory;
        self
    }

    #[must_use]
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    /// Share of correct answers in percent; `None` for an empty session.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        if self.total_questions == 0 {
            return None;
        }
        Some(f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0)
    }

    /// True when `percentage >= threshold`, compared without rounding.
    #[must_use]
    pub fn reaches_percent(&self, threshold: u32) -> bool {
        if self.total_questions == 0 {
            return false;
        }
        u64::from(self.correct_answers) * 100 >= u64::from(threshold) * u64::from(self.total_questions)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.correct_answers == self.total_questions
    }
}

//
// ─── PERFORMANCE BAND ──────────────────────────────────────────────────────────
//

/// Feedback tier shown when a practice session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Improving,
    NeedsPractice,
}

impl PerformanceBand {
    #[must_use]
    pub fn for_outcome(outcome: &SessionOutcome) -> Self {
        if outcome.reaches_percent(80) {
            PerformanceBand::Excellent
        } else if outcome.reaches_percent(60) {
            PerformanceBand::Good
        } else if outcome.reaches_percent(40) {
            PerformanceBand::Improving
        } else {
            PerformanceBand::NeedsPractice
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "¡Excelente trabajo!",
            PerformanceBand::Good => "¡Buen trabajo! Sigue así",
            PerformanceBand::Improving => "Sigue practicando, vas mejorando",
            PerformanceBand::NeedsPractice => "Necesitas más práctica. ¡No te rindas!",
        }
    }
}
