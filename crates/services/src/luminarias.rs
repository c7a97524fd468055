use std::sync::Arc;

use serde::Serialize;

use playtest_core::model::{LuminariasTransaction, SessionOutcome, TransactionKind, UserId};
use playtest_core::{Clock, calculate_reward};
use storage::repository::{LuminariasRepository, TransactionRow};

use crate::error::LuminariasError;

/// Result of crediting a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardReceipt {
    pub amount: u32,
    /// Ledger id of the credit, `None` when nothing was earned.
    pub transaction_id: Option<i64>,
    pub balance: i64,
}

/// Luminarias wallet: rewards, spending and history for any user.
#[derive(Clone)]
pub struct LuminariasService {
    clock: Clock,
    ledger: Arc<dyn LuminariasRepository>,
}

impl LuminariasService {
    #[must_use]
    pub fn new(clock: Clock, ledger: Arc<dyn LuminariasRepository>) -> Self {
        Self { clock, ledger }
    }

    /// Current balance of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `LuminariasError::Storage` on repository failures.
    pub async fn balance(&self, user_id: UserId) -> Result<i64, LuminariasError> {
        Ok(self.ledger.balance(user_id).await?)
    }

    /// Compute the reward for `outcome` and credit it.
    ///
    /// A zero reward leaves the ledger untouched.
    ///
    /// # Errors
    ///
    /// Returns `LuminariasError::Storage` if the credit cannot be persisted.
    pub async fn reward_session(
        &self,
        user_id: UserId,
        outcome: &SessionOutcome,
    ) -> Result<RewardReceipt, LuminariasError> {
        let amount = calculate_reward(outcome);
        if amount == 0 {
            tracing::debug!(user = %user_id, mode = %outcome.game_mode, "session earned no reward");
            return Ok(RewardReceipt {
                amount,
                transaction_id: None,
                balance: self.balance(user_id).await?,
            });
        }

        let tx = LuminariasTransaction::session_reward(user_id, outcome, amount, self.clock.now())?;
        let id = self.ledger.append_transaction(&tx).await?;
        let balance = self.balance(user_id).await?;
        tracing::info!(
            user = %user_id,
            mode = %outcome.game_mode,
            correct = outcome.correct_answers,
            total = outcome.total_questions,
            amount,
            balance,
            "credited session reward"
        );

        Ok(RewardReceipt {
            amount,
            transaction_id: Some(id),
            balance,
        })
    }

    /// Spend `amount` Luminarias and return the ledger id.
    ///
    /// # Errors
    ///
    /// Returns `LuminariasError::InsufficientBalance` when the balance does not cover `amount`,
    /// `LuminariasError::Transaction` for a zero amount.
    pub async fn spend(
        &self,
        user_id: UserId,
        amount: u32,
        subcategory: &str,
        action_type: &str,
        description: &str,
    ) -> Result<i64, LuminariasError> {
        let tx = LuminariasTransaction::new(
            user_id,
            TransactionKind::Spend,
            amount,
            "user_spending",
            subcategory,
            action_type,
            description,
            self.clock.now(),
        )?;
        match self.ledger.append_transaction(&tx).await {
            Ok(id) => {
                tracing::info!(user = %user_id, amount, action_type, "spent luminarias");
                Ok(id)
            }
            Err(err) => {
                tracing::warn!(user = %user_id, amount, error = %err, "spend rejected");
                Err(err.into())
            }
        }
    }

    /// Most recent ledger entries first.
    ///
    /// # Errors
    ///
    /// Returns `LuminariasError::Storage` on repository failures.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TransactionRow>, LuminariasError> {
        Ok(self.ledger.list_transactions(user_id, limit).await?)
    }
}
