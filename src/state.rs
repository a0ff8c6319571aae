// Session store: holds the mutable record and notifies after every change.
// Bet operations clamp into [1, min(max_bet, balance)]; the generic patch
// entry point merges without validation. Balance is mutated only by the spin
// engine (debit/credit) or an explicit patch.

use crate::types::{Layout, RiskLevel, SessionState, StatePatch};

type ChangeCallback = Box<dyn Fn(&SessionState)>;

/// Owner of the session record. All mutation goes through the named
/// operations so the change hook fires exactly once per logical change.
pub struct SessionStore {
    state: SessionState,
    on_change: Option<ChangeCallback>,
}

impl SessionStore {
    pub fn new(state: SessionState) -> Self {
        SessionStore {
            state,
            on_change: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Register the change-notification hook, invoked after every mutation.
    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    fn notify(&self) {
        if let Some(callback) = &self.on_change {
            callback(&self.state);
        }
    }

    fn bet_ceiling(&self) -> f64 {
        self.state.max_bet.min(self.state.balance)
    }

    /// `bet = max(1, floor(bet / 2))`. No-op while spinning.
    pub fn half_bet(&mut self) {
        if self.state.is_spinning {
            return;
        }
        self.state.bet_amount = (self.state.bet_amount / 2.0).floor().max(1.0);
        self.notify();
    }

    /// `bet = min(bet * 2, max_bet, balance)`. No-op while spinning.
    pub fn double_bet(&mut self) {
        if self.state.is_spinning {
            return;
        }
        self.state.bet_amount = (self.state.bet_amount * 2.0).min(self.bet_ceiling()).max(1.0);
        self.notify();
    }

    /// `bet = min(max_bet, balance)`. No-op while spinning.
    pub fn max_bet(&mut self) {
        if self.state.is_spinning {
            return;
        }
        self.state.bet_amount = self.bet_ceiling().max(1.0);
        self.notify();
    }

    /// Quick-set. Clamps to `[1, max_bet]` only; the balance check happens at
    /// spin time so an over-balance bet surfaces as InsufficientBalance
    /// rather than being silently shrunk. No-op while spinning.
    pub fn set_bet_amount(&mut self, amount: f64) {
        if self.state.is_spinning {
            return;
        }
        self.state.bet_amount = amount.clamp(1.0, self.state.max_bet);
        self.notify();
    }

    /// No-op while spinning.
    pub fn set_risk_level(&mut self, level: RiskLevel) {
        if self.state.is_spinning {
            return;
        }
        self.state.risk_level = level;
        self.notify();
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.state.theme = theme.to_string();
        self.notify();
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.state.layout = layout;
        self.notify();
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.state.sound_enabled = !self.state.sound_enabled;
        self.notify();
        self.state.sound_enabled
    }

    pub fn set_auto_play(&mut self, enabled: bool) {
        self.state.auto_play = enabled;
        self.notify();
    }

    /// Shallow merge with no validation. Range enforcement belongs to the
    /// named operations above.
    pub fn apply_patch(&mut self, patch: StatePatch) {
        if let Some(balance) = patch.balance {
            self.state.balance = balance;
        }
        if let Some(bet_amount) = patch.bet_amount {
            self.state.bet_amount = bet_amount;
        }
        if let Some(max_bet) = patch.max_bet {
            self.state.max_bet = max_bet;
        }
        if let Some(risk_level) = patch.risk_level {
            self.state.risk_level = risk_level;
        }
        if let Some(auto_play) = patch.auto_play {
            self.state.auto_play = auto_play;
        }
        if let Some(theme) = patch.theme {
            self.state.theme = theme;
        }
        if let Some(sound_enabled) = patch.sound_enabled {
            self.state.sound_enabled = sound_enabled;
        }
        self.notify();
    }

    /// Spin entry: set the in-flight flag and debit the stake. The caller
    /// has already verified `balance >= bet_amount`.
    pub(crate) fn begin_spin(&mut self) {
        self.state.is_spinning = true;
        self.state.balance -= self.state.bet_amount;
        self.notify();
    }

    pub(crate) fn credit(&mut self, amount: f64) {
        self.state.balance += amount;
        self.notify();
    }

    /// Settlement exit: clear the in-flight flag, restoring the spin control.
    pub(crate) fn end_spin(&mut self) {
        self.state.is_spinning = false;
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameworkConfig;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn store() -> SessionStore {
        SessionStore::new(FrameworkConfig::default().initial_state())
    }

    #[test]
    fn half_bet_floors_and_bottoms_at_one() {
        let mut s = store();
        s.set_bet_amount(5.0);
        s.half_bet();
        assert_eq!(s.state().bet_amount, 2.0);
        s.half_bet();
        s.half_bet();
        s.half_bet();
        assert_eq!(s.state().bet_amount, 1.0);
    }

    #[test]
    fn double_bet_respects_balance_and_max_bet() {
        let mut s = store();
        s.apply_patch(StatePatch {
            balance: Some(30.0),
            bet_amount: Some(20.0),
            ..Default::default()
        });
        s.double_bet();
        assert_eq!(s.state().bet_amount, 30.0);

        s.apply_patch(StatePatch {
            balance: Some(500.0),
            bet_amount: Some(80.0),
            ..Default::default()
        });
        s.double_bet();
        assert_eq!(s.state().bet_amount, 100.0);
    }

    #[test]
    fn max_bet_is_idempotent() {
        let mut s = store();
        s.apply_patch(StatePatch {
            balance: Some(64.0),
            ..Default::default()
        });
        s.max_bet();
        let first = s.state().bet_amount;
        s.max_bet();
        assert_eq!(s.state().bet_amount, first);
        assert_eq!(first, 64.0);
    }

    #[test]
    fn set_bet_amount_ignores_balance() {
        let mut s = store();
        s.apply_patch(StatePatch {
            balance: Some(5.0),
            ..Default::default()
        });
        s.set_bet_amount(50.0);
        // Over-balance is allowed here; the spin guard rejects it later.
        assert_eq!(s.state().bet_amount, 50.0);
    }

    #[test]
    fn bet_and_risk_changes_are_ignored_while_spinning() {
        let mut s = store();
        s.begin_spin();
        s.half_bet();
        s.double_bet();
        s.max_bet();
        s.set_bet_amount(42.0);
        s.set_risk_level(RiskLevel::High);
        assert_eq!(s.state().bet_amount, 10.0);
        assert_eq!(s.state().risk_level, RiskLevel::Medium);
    }

    #[test]
    fn change_hook_fires_after_every_mutation() {
        let mut s = store();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = count.clone();
        s.set_on_change(Box::new(move |_| count_clone.set(count_clone.get() + 1)));

        s.set_bet_amount(20.0);
        s.set_theme("neon");
        s.toggle_sound();
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn hook_observes_the_new_state() {
        let mut s = store();
        let seen = Rc::new(Cell::new(0.0));
        let seen_clone = seen.clone();
        s.set_on_change(Box::new(move |state| seen_clone.set(state.bet_amount)));
        s.set_bet_amount(25.0);
        assert_eq!(seen.get(), 25.0);
    }

    #[test]
    fn patch_merges_shallowly_without_clamping() {
        let mut s = store();
        s.apply_patch(StatePatch {
            balance: Some(-3.0),
            theme: Some("sunset".to_string()),
            ..Default::default()
        });
        assert_eq!(s.state().balance, -3.0);
        assert_eq!(s.state().theme, "sunset");
        assert_eq!(s.state().bet_amount, 10.0);
    }

    proptest! {
        #[test]
        fn double_bet_never_exceeds_ceiling(balance in 1.0f64..10_000.0, bet in 1.0f64..100.0) {
            let mut s = store();
            s.apply_patch(StatePatch {
                balance: Some(balance),
                bet_amount: Some(bet),
                ..Default::default()
            });
            s.double_bet();
            let state = s.state();
            prop_assert!(state.bet_amount <= state.max_bet.min(balance).max(1.0));
            prop_assert!(state.bet_amount >= 1.0);
        }

        #[test]
        fn set_bet_amount_stays_in_range(amount in -1_000.0f64..1_000.0) {
            let mut s = store();
            s.set_bet_amount(amount);
            let state = s.state();
            prop_assert!(state.bet_amount >= 1.0);
            prop_assert!(state.bet_amount <= state.max_bet);
        }

        #[test]
        fn half_bet_never_goes_below_one(bet in 1.0f64..100.0) {
            let mut s = store();
            s.set_bet_amount(bet);
            s.half_bet();
            prop_assert!(s.state().bet_amount >= 1.0);
        }
    }
}
