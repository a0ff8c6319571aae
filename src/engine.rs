// Spin/outcome state machine: Idle -> Spinning -> Settling -> Idle.
// Debit always precedes the outcome callback; credit precedes the win
// visual; is_spinning is false again before the next spin can be accepted.
// Every settle path clears the flag, so one failure can never wedge the
// session in Spinning.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, warn};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::dispatch::RenderDispatcher;
use crate::error::FrameworkError;
use crate::plugin::{GamePlugin, SpinContext};
use crate::schedule::{Scheduler, TimerId};
use crate::state::SessionStore;
use crate::types::{CanvasSizes, RiskMultipliers, SpinResult};

/// Everything one game session owns. Shared behind `Rc<RefCell<..>>` so
/// outcome handles and timers can reach it without keeping it alive.
pub(crate) struct Session {
    pub(crate) store: SessionStore,
    pub(crate) plugin: Box<dyn GamePlugin>,
    pub(crate) dispatcher: RenderDispatcher,
    pub(crate) scheduler: Rc<dyn Scheduler>,
    pub(crate) rng: Rc<RefCell<SmallRng>>,
    pub(crate) multipliers: RiskMultipliers,
    pub(crate) canvas_sizes: CanvasSizes,
    pub(crate) autoplay_delay_ms: u32,
    pub(crate) settle_redraw_delay_ms: u32,
    pub(crate) win_probability: f64,
    /// Monotonic spin counter. Outcome handles carry the epoch they were
    /// issued for; a settlement with a stale epoch is dropped.
    pub(crate) spin_epoch: u64,
    pub(crate) pending_autoplay: Option<TimerId>,
    pub(crate) pending_redraw: Option<TimerId>,
    pub(crate) destroyed: bool,
}

pub(crate) type SharedSession = Rc<RefCell<Session>>;

/// Start one spin cycle. Silently ignores the request while a spin is in
/// flight (duplicate-click debounce); rejects it before any mutation when
/// the balance cannot cover the bet.
pub(crate) fn spin(shared: &SharedSession) -> Result<(), FrameworkError> {
    let (epoch, spin_call) = {
        let mut s = shared.borrow_mut();
        if s.destroyed {
            return Ok(());
        }
        let state = s.store.state();
        if state.is_spinning {
            debug!("spin ignored: a spin is already in flight");
            return Ok(());
        }
        if state.balance < state.bet_amount {
            return Err(FrameworkError::InsufficientBalance {
                bet: state.bet_amount,
                balance: state.balance,
            });
        }

        cancel_pending(&mut s);
        s.spin_epoch += 1;
        let epoch = s.spin_epoch;
        s.store.begin_spin();
        redraw_locked(&mut s);

        let state = s.store.state();
        let ctx = SpinContext::new(
            Rc::downgrade(shared),
            s.scheduler.clone(),
            s.rng.clone(),
            epoch,
            s.win_probability,
            state.bet_amount,
            state.risk_level,
        );
        (epoch, s.plugin.spin(ctx))
    };

    if let Err(e) = spin_call {
        error!("plugin spin failed: {e}; substituting a random outcome");
        let is_win = {
            let s = shared.borrow();
            let roll = s.rng.borrow_mut().gen::<f64>();
            roll < s.win_probability
        };
        settle(shared, SpinResult::from_win(is_win), epoch);
    }
    Ok(())
}

/// Settle an outcome: credit on win, run the win/loss visual, clear the
/// spinning flag, and schedule the continuation (auto-play or redraw).
pub(crate) fn settle(shared: &SharedSession, result: SpinResult, epoch: u64) {
    let mut s = shared.borrow_mut();
    if s.destroyed {
        return;
    }
    if !s.store.state().is_spinning || s.spin_epoch != epoch {
        debug!("stale spin settlement ignored");
        return;
    }

    if result.is_win {
        let bet = s.store.state().bet_amount;
        let risk = s.store.state().risk_level;
        let multipliers = s.multipliers;
        let win_amount = match s.plugin.calculate_win(bet, risk, &multipliers, &result) {
            Ok(amount) => amount,
            Err(e) => {
                error!("calculate_win failed: {e}; paying bet * 2");
                bet * 2.0
            }
        };
        s.store.credit(win_amount);
        s.store.end_spin();
        let Session {
            store,
            plugin,
            dispatcher,
            ..
        } = &mut *s;
        dispatcher.draw_win(plugin.as_mut(), win_amount, &result, store.state());
    } else {
        s.store.end_spin();
        let Session {
            store,
            plugin,
            dispatcher,
            ..
        } = &mut *s;
        dispatcher.draw_loss(plugin.as_mut(), &result, store.state());
    }

    schedule_continuation(&mut s, shared);
}

/// After settlement: chain the next auto-play spin while the balance lasts,
/// otherwise schedule a plain redraw that clears the win/loss overlay.
fn schedule_continuation(s: &mut Session, shared: &SharedSession) {
    let state = s.store.state();
    if state.auto_play && state.balance >= state.bet_amount {
        let weak = Rc::downgrade(shared);
        let id = s.scheduler.schedule(
            s.autoplay_delay_ms,
            Box::new(move || {
                let Some(session) = weak.upgrade() else {
                    return;
                };
                session.borrow_mut().pending_autoplay = None;
                if let Err(e) = spin(&session) {
                    warn!("auto-play stopped: {e}");
                }
            }),
        );
        s.pending_autoplay = Some(id);
    } else {
        let weak = Rc::downgrade(shared);
        let id = s.scheduler.schedule(
            s.settle_redraw_delay_ms,
            Box::new(move || {
                let Some(session) = weak.upgrade() else {
                    return;
                };
                let mut s = session.borrow_mut();
                s.pending_redraw = None;
                redraw_locked(&mut s);
            }),
        );
        s.pending_redraw = Some(id);
    }
}

pub(crate) fn redraw_locked(s: &mut Session) {
    let Session {
        store,
        plugin,
        dispatcher,
        ..
    } = s;
    dispatcher.draw_frame(store.state(), plugin.as_mut());
}

pub(crate) fn cancel_pending(s: &mut Session) {
    if let Some(id) = s.pending_autoplay.take() {
        s.scheduler.cancel(id);
    }
    if let Some(id) = s.pending_redraw.take() {
        s.scheduler.cancel(id);
    }
}

/// Teardown: cancel pending timers and release the secondary backend. A
/// destroyed session ignores late outcomes and timer fires.
pub(crate) fn destroy(s: &mut Session) {
    cancel_pending(s);
    s.dispatcher.teardown_secondary();
    s.destroyed = true;
}
