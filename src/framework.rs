// Framework facade. Wires the store, plugin, dispatcher, and scheduler into
// one session and exposes the operations the control surface calls.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::backend::{BackendProbe, BackendStrategy};
use crate::dispatch::RenderDispatcher;
use crate::engine::{self, Session, SharedSession};
use crate::error::FrameworkError;
use crate::plugin::{BuiltinGame, GamePlugin};
use crate::schedule::Scheduler;
use crate::state::SessionStore;
use crate::surface::DrawSurface;
use crate::types::{FrameworkConfig, Layout, RiskLevel, SessionState, StatePatch};

/// Fixed fallback seed so unconfigured prototypes behave the same run to run.
const DEFAULT_RNG_SEED: u64 = 0x5eed_1ab5;

/// Runtime wiring that is not part of the JSON configuration: the game
/// plugin and the secondary backend acquisition.
#[derive(Default)]
pub struct FrameworkOptions {
    /// Game callbacks. `None` runs the built-in all-defaults game.
    pub plugin: Option<Box<dyn GamePlugin>>,
    /// Secondary backend construction strategies, attempted in order.
    pub strategies: Vec<BackendStrategy>,
    /// Host-computed capability probe for the enhanced renderer.
    pub probe: BackendProbe,
}

/// One game session: state machine, render dispatch, and plugin contract
/// behind a single handle.
pub struct Framework {
    session: SharedSession,
}

impl Framework {
    /// Build a session with the built-in game and no secondary backend.
    pub fn new(
        config: FrameworkConfig,
        primary: Box<dyn DrawSurface>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self::with_options(config, primary, scheduler, FrameworkOptions::default())
    }

    pub fn with_options(
        config: FrameworkConfig,
        primary: Box<dyn DrawSurface>,
        scheduler: Rc<dyn Scheduler>,
        options: FrameworkOptions,
    ) -> Self {
        let rng = Rc::new(RefCell::new(SmallRng::seed_from_u64(
            config.rng_seed.unwrap_or(DEFAULT_RNG_SEED),
        )));
        let dispatcher = RenderDispatcher::new(
            primary,
            options.strategies,
            options.probe,
            config.theme_colors.clone(),
            config.debug_grid,
            config.title.clone(),
        );
        let store = SessionStore::new(config.initial_state());
        let plugin = options.plugin.unwrap_or_else(|| Box::new(BuiltinGame));

        let session = Rc::new(RefCell::new(Session {
            store,
            plugin,
            dispatcher,
            scheduler,
            rng,
            multipliers: config.risk_multipliers,
            canvas_sizes: config.canvas_sizes,
            autoplay_delay_ms: config.autoplay_delay_ms,
            settle_redraw_delay_ms: config.settle_redraw_delay_ms,
            win_probability: config.default_win_probability,
            spin_epoch: 0,
            pending_autoplay: None,
            pending_redraw: None,
            destroyed: false,
        }));

        let framework = Framework { session };
        framework.redraw();
        framework
    }

    /// Start a spin. Silent no-op while one is in flight; fails with
    /// `InsufficientBalance` (before any mutation) when the bet exceeds the
    /// balance.
    pub fn spin(&mut self) -> Result<(), FrameworkError> {
        engine::spin(&self.session)
    }

    pub fn half_bet(&mut self) {
        self.session.borrow_mut().store.half_bet();
        self.redraw();
    }

    pub fn double_bet(&mut self) {
        self.session.borrow_mut().store.double_bet();
        self.redraw();
    }

    pub fn max_bet(&mut self) {
        self.session.borrow_mut().store.max_bet();
        self.redraw();
    }

    pub fn set_bet_amount(&mut self, amount: f64) {
        self.session.borrow_mut().store.set_bet_amount(amount);
        self.redraw();
    }

    pub fn set_risk_level(&mut self, level: RiskLevel) {
        self.session.borrow_mut().store.set_risk_level(level);
        self.redraw();
    }

    pub fn set_auto_play(&mut self, enabled: bool) {
        self.session.borrow_mut().store.set_auto_play(enabled);
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.session.borrow_mut().store.toggle_sound()
    }

    pub fn change_theme(&mut self, theme: &str) {
        self.session.borrow_mut().store.set_theme(theme);
        self.redraw();
    }

    /// Switch layout: resize the primary surface to the configured
    /// dimensions and give the secondary backend another chance.
    pub fn switch_layout(&mut self, layout: Layout) {
        {
            let mut s = self.session.borrow_mut();
            s.store.set_layout(layout);
            let size = s.canvas_sizes.for_layout(layout);
            s.dispatcher.resize(size);
        }
        self.redraw();
    }

    /// Shallow state merge with no validation.
    pub fn update_state(&mut self, patch: StatePatch) {
        self.session.borrow_mut().store.apply_patch(patch);
        self.redraw();
    }

    /// Snapshot of the session record.
    pub fn state(&self) -> SessionState {
        self.session.borrow().store.state().clone()
    }

    /// Register the hook invoked after every state mutation.
    pub fn on_state_change(&mut self, callback: Box<dyn Fn(&SessionState)>) {
        self.session.borrow_mut().store.set_on_change(callback);
    }

    /// Winnings the current bet and risk tier would pay.
    pub fn potential_win(&self) -> f64 {
        let s = self.session.borrow();
        let state = s.store.state();
        state.bet_amount * s.multipliers.for_level(state.risk_level)
    }

    pub fn redraw(&self) {
        engine::redraw_locked(&mut self.session.borrow_mut());
    }

    /// Cancel pending timers and release the secondary backend. Outcomes and
    /// timer fires arriving after this point are ignored.
    pub fn destroy(&mut self) {
        engine::destroy(&mut self.session.borrow_mut());
    }
}
