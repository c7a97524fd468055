use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::outcome::{GameMode, SessionOutcome};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
    #[error("transaction amount must be positive")]
    ZeroAmount,

    #[error("unknown transaction kind: {0}")]
    UnknownKind(String),
}

/// Direction of a Luminarias movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Earn,
    Spend,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Earn => "earn",
            TransactionKind::Spend => "spend",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earn" => Ok(TransactionKind::Earn),
            "spend" => Ok(TransactionKind::Spend),
            other => Err(TransactionError::UnknownKind(other.to_owned())),
        }
    }
}

/// Metadata attached to a session reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardMetadata {
    pub game_mode: GameMode,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub score: Option<i64>,
    pub victory: bool,
}

impl From<&SessionOutcome> for RewardMetadata {
    fn from(outcome: &SessionOutcome) -> Self {
        Self {
            game_mode: outcome.game_mode.clone(),
            correct_answers: outcome.correct_answers,
            total_questions: outcome.total_questions,
            score: outcome.score,
            victory: outcome.victory,
        }
    }
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminariasTransaction {
    user_id: UserId,
    kind: TransactionKind,
    amount: u32,
    category: String,
    subcategory: String,
    action_type: String,
    description: String,
    metadata: Option<RewardMetadata>,
    created_at: DateTime<Utc>,
}

impl LuminariasTransaction {
    /// Build a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::ZeroAmount` when `amount` is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        kind: TransactionKind,
        amount: u32,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        action_type: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TransactionError> {
        if amount == 0 {
            return Err(TransactionError::ZeroAmount);
        }
        Ok(Self {
            user_id,
            kind,
            amount,
            category: category.into(),
            subcategory: subcategory.into(),
            action_type: action_type.into(),
            description: description.into(),
            metadata: None,
            created_at,
        })
    }

    /// Entry crediting `amount` for a completed session.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::ZeroAmount` when `amount` is zero.
    pub fn session_reward(
        user_id: UserId,
        outcome: &SessionOutcome,
        amount: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TransactionError> {
        let description = format!(
            "Completar partida en modo {}: {}/{} correctas",
            outcome.game_mode.label(),
            outcome.correct_answers,
            outcome.total_questions
        );
        let tx = Self::new(
            user_id,
            TransactionKind::Earn,
            amount,
            "user_earning",
            "study_activity",
            "complete_session",
            description,
            created_at,
        )?;
        Ok(tx.with_metadata(RewardMetadata::from(outcome)))
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: RewardMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    #[must_use]
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Effect on the balance: positive for earnings, negative for spending.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Earn => i64::from(self.amount),
            TransactionKind::Spend => -i64::from(self.amount),
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&RewardMetadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn zero_amount_is_rejected() {
        let err = LuminariasTransaction::new(
            UserId::new(1),
            TransactionKind::Spend,
            0,
            "shop",
            "item",
            "buy",
            "nothing",
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, TransactionError::ZeroAmount);
    }

    #[test]
    fn session_reward_describes_the_game() {
        let outcome = SessionOutcome::new(GameMode::Duel, 3, 10).with_victory(true);
        let tx =
            LuminariasTransaction::session_reward(UserId::new(7), &outcome, 17, fixed_now()).unwrap();

        assert_eq!(tx.kind(), TransactionKind::Earn);
        assert_eq!(tx.signed_amount(), 17);
        assert_eq!(tx.action_type(), "complete_session");
        assert_eq!(tx.description(), "Completar partida en modo Duelo: 3/10 correctas");
        let meta = tx.metadata().unwrap();
        assert_eq!(meta.game_mode, GameMode::Duel);
        assert!(meta.victory);
    }

    #[test]
    fn spend_is_negative() {
        let tx = LuminariasTransaction::new(
            UserId::new(1),
            TransactionKind::Spend,
            12,
            "shop",
            "avatar",
            "buy_item",
            "Avatar",
            fixed_now(),
        )
        .unwrap();
        assert_eq!(tx.signed_amount(), -12);
        assert_eq!("spend".parse::<TransactionKind>().unwrap(), TransactionKind::Spend);
    }
}
