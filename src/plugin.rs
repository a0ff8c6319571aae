// Game plugin contract. Five operations, each with a built-in default, so a
// configured plugin is complete from construction on and every call site can
// rely on the operation existing. Overrides replace defaults per method.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::rngs::SmallRng;
use rand::Rng;

use crate::engine::{self, Session};
use crate::error::PluginError;
use crate::schedule::Scheduler;
use crate::surface::{DrawSurface, TextStyle};
use crate::types::{RiskLevel, RiskMultipliers, SessionState, SpinResult};

/// Handed to [`GamePlugin::spin`]. Completing it settles the spin; the handle
/// is consumed on completion so an outcome can be delivered at most once.
/// Dropping it without completing leaves the session visually spinning, which
/// mirrors a game whose animation never finishes.
pub struct SpinContext {
    session: Weak<RefCell<Session>>,
    scheduler: Rc<dyn Scheduler>,
    rng: Rc<RefCell<SmallRng>>,
    epoch: u64,
    win_probability: f64,
    bet_amount: f64,
    risk_level: RiskLevel,
}

impl SpinContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session: Weak<RefCell<Session>>,
        scheduler: Rc<dyn Scheduler>,
        rng: Rc<RefCell<SmallRng>>,
        epoch: u64,
        win_probability: f64,
        bet_amount: f64,
        risk_level: RiskLevel,
    ) -> Self {
        SpinContext {
            session,
            scheduler,
            rng,
            epoch,
            win_probability,
            bet_amount,
            risk_level,
        }
    }

    /// Stake debited for this spin.
    pub fn bet_amount(&self) -> f64 {
        self.bet_amount
    }

    /// Risk tier active when the spin started.
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Configured win probability for outcome generation without game logic.
    pub fn win_probability(&self) -> f64 {
        self.win_probability
    }

    /// Uniform random value in `[0, 1)` from the session RNG.
    pub fn random(&self) -> f64 {
        self.rng.borrow_mut().gen::<f64>()
    }

    /// Deliver the spin outcome and settle the session. Consumes the handle.
    pub fn complete(self, result: SpinResult) {
        let Some(session) = self.session.upgrade() else {
            log::debug!("spin outcome arrived after session teardown; dropped");
            return;
        };
        if session.try_borrow_mut().is_ok() {
            engine::settle(&session, result, self.epoch);
        } else {
            // Completion arrived re-entrantly from inside the spin dispatch;
            // settle on the next scheduler tick instead.
            let weak = self.session.clone();
            let epoch = self.epoch;
            self.scheduler.schedule(
                0,
                Box::new(move || {
                    if let Some(session) = weak.upgrade() {
                        engine::settle(&session, result, epoch);
                    }
                }),
            );
        }
    }
}

/// Callback bundle supplied by one game variant (dice, cards, ...).
///
/// All five operations have defaults: a ~30% random outcome, a
/// multiplier-table payout, and plain text rendering. A prototype overrides
/// only what it needs.
pub trait GamePlugin {
    /// Start one outcome cycle. Must complete `ctx` exactly once, on any
    /// schedule. A returned error makes the engine substitute a random
    /// outcome so the session cannot deadlock.
    fn spin(&mut self, ctx: SpinContext) -> Result<(), PluginError> {
        let is_win = ctx.random() < ctx.win_probability();
        ctx.complete(SpinResult::from_win(is_win));
        Ok(())
    }

    /// Payout for a winning result. Defaults to the risk-tier multiplier.
    fn calculate_win(
        &mut self,
        bet_amount: f64,
        risk_level: RiskLevel,
        multipliers: &RiskMultipliers,
        _result: &SpinResult,
    ) -> Result<f64, PluginError> {
        Ok(bet_amount * multipliers.for_level(risk_level))
    }

    /// Draw the game body onto the prepared frame.
    fn render_game(
        &mut self,
        surface: &mut dyn DrawSurface,
        width: f64,
        height: f64,
        _state: &SessionState,
    ) -> Result<(), PluginError> {
        surface.draw_text(
            "Place your bet and spin",
            width / 2.0,
            height / 2.0,
            &TextStyle::heading(),
        )?;
        Ok(())
    }

    /// Overlay for a winning settlement.
    fn handle_win(
        &mut self,
        surface: &mut dyn DrawSurface,
        width: f64,
        height: f64,
        win_amount: f64,
        _result: &SpinResult,
    ) -> Result<(), PluginError> {
        surface.draw_text(
            &format!("WIN +{win_amount}"),
            width / 2.0,
            height / 2.0,
            &TextStyle::heading().with_color("#ffd700"),
        )?;
        Ok(())
    }

    /// Overlay for a losing settlement.
    fn handle_loss(
        &mut self,
        surface: &mut dyn DrawSurface,
        width: f64,
        height: f64,
        _result: &SpinResult,
    ) -> Result<(), PluginError> {
        surface.draw_text(
            "TRY AGAIN",
            width / 2.0,
            height / 2.0,
            &TextStyle::heading().with_color("#ff6b6b"),
        )?;
        Ok(())
    }
}

/// The all-defaults plugin used when no game logic is configured.
#[derive(Debug, Default)]
pub struct BuiltinGame;

impl GamePlugin for BuiltinGame {}
