//! Luminarias reward for a completed session.

use crate::model::SessionOutcome;

/// Smallest reward for any non-empty session.
pub const MIN_REWARD: u32 = 5;
/// Largest reward for a single session.
pub const MAX_REWARD: u32 = 50;
/// Bonus for winning a competitive session.
pub const VICTORY_BONUS: u32 = 10;
/// Bonus for answering every question correctly.
pub const PERFECT_BONUS: u32 = 15;

/// Percentage tiers and their base reward, highest first.
const BASE_TIERS: [(u32, u32); 4] = [(90, 25), (75, 20), (60, 15), (40, 10)];
const PARTICIPATION_BASE: u32 = 5;

/// Base reward before the mode multiplier and bonuses.
#[must_use]
pub fn base_reward(outcome: &SessionOutcome) -> u32 {
    BASE_TIERS
        .iter()
        .find(|(threshold, _)| outcome.reaches_percent(*threshold))
        .map_or(PARTICIPATION_BASE, |(_, base)| *base)
}

/// Luminarias earned for `outcome`.
///
/// Empty sessions earn nothing; anything else earns between
/// [`MIN_REWARD`] and [`MAX_REWARD`] inclusive.
///
/// # Examples
///
/// ```
/// # use playtest_core::model::{GameMode, SessionOutcome};
/// # use playtest_core::reward::calculate_reward;
/// let outcome = SessionOutcome::new(GameMode::Duel, 3, 10).with_victory(true);
/// assert_eq!(calculate_reward(&outcome), 17);
/// ```
#[must_use]
pub fn calculate_reward(outcome: &SessionOutcome) -> u32 {
    if outcome.total_questions == 0 {
        return 0;
    }

    let mut amount = base_reward(outcome) * outcome.game_mode.multiplier_tenths() / 10;
    if outcome.victory {
        amount += VICTORY_BONUS;
    }
    if outcome.is_perfect() {
        amount += PERFECT_BONUS;
    }

    amount.clamp(MIN_REWARD, MAX_REWARD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameMode;
    use proptest::prelude::*;

    fn outcome(mode: &str, correct: u32, total: u32) -> SessionOutcome {
        SessionOutcome::new(mode.parse().unwrap(), correct, total)
    }

    #[test]
    fn perfect_classic_session() {
        assert_eq!(calculate_reward(&outcome("classic", 10, 10)), 40);
    }

    #[test]
    fn duel_victory_with_low_score() {
        let o = outcome("duel", 3, 10).with_victory(true);
        assert_eq!(calculate_reward(&o), 17);
    }

    #[test]
    fn empty_session_earns_nothing() {
        assert_eq!(calculate_reward(&outcome("exam", 0, 0)), 0);
    }

    #[test]
    fn unknown_mode_uses_neutral_multiplier() {
        assert_eq!(calculate_reward(&outcome("unknownmode", 7, 10)), 15);
    }

    #[test]
    fn base_tiers() {
        assert_eq!(base_reward(&outcome("classic", 9, 10)), 25);
        assert_eq!(base_reward(&outcome("classic", 3, 4)), 20);
        assert_eq!(base_reward(&outcome("classic", 6, 10)), 15);
        assert_eq!(base_reward(&outcome("classic", 2, 5)), 10);
        assert_eq!(base_reward(&outcome("classic", 1, 3)), 5);
    }

    #[test]
    fn multiplier_floors() {
        // 25 * 1.1 = 27.5
        assert_eq!(calculate_reward(&outcome("trivial", 9, 10)), 27);
        // 15 * 1.3 = 19.5
        assert_eq!(calculate_reward(&outcome("lives", 6, 10)), 19);
    }

    #[test]
    fn bonuses_stack_and_clamp() {
        // 25 * 1.6 = 40, + 10 + 15 = 65 -> 50
        let o = outcome("marathon", 20, 20).with_victory(true);
        assert_eq!(calculate_reward(&o), MAX_REWARD);
        assert_eq!(calculate_reward(&outcome("classic", 0, 10)), MIN_REWARD);
    }

    fn arb_mode() -> impl Strategy<Value = GameMode> {
        prop_oneof![
            proptest::sample::select(GameMode::KNOWN.to_vec()),
            "[a-z]{1,8}".prop_map(GameMode::from),
        ]
    }

    proptest! {
        #[test]
        fn reward_is_bounded(mode in arb_mode(), total in 1u32..200, pick in 0u32..=200, victory in any::<bool>()) {
            let correct = pick.min(total);
            let o = SessionOutcome::new(mode, correct, total).with_victory(victory);
            let reward = calculate_reward(&o);
            prop_assert!((MIN_REWARD..=MAX_REWARD).contains(&reward));
        }
    }
}
