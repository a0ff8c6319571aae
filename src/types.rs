// Strong typing over strings. Session record, spin results, and the JSON
// configuration surface shared with the host page.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Named payout tier applied to potential winnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    /// Parse a lowercase name as sent by DOM controls ("low"/"medium"/"high").
    pub fn parse(name: &str) -> Option<RiskLevel> {
        match name {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Presentation layout. Selects canvas dimensions and gradient direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Pc,
    Mobile,
}

impl Layout {
    pub fn parse(name: &str) -> Option<Layout> {
        match name {
            "pc" => Some(Layout::Pc),
            "mobile" => Some(Layout::Mobile),
            _ => None,
        }
    }
}

/// Payout multiplier per risk tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskMultipliers {
    #[serde(default = "default_low_multiplier")]
    pub low: f64,
    #[serde(default = "default_medium_multiplier")]
    pub medium: f64,
    #[serde(default = "default_high_multiplier")]
    pub high: f64,
}

impl RiskMultipliers {
    pub fn for_level(&self, level: RiskLevel) -> f64 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }
}

impl Default for RiskMultipliers {
    fn default() -> Self {
        RiskMultipliers {
            low: default_low_multiplier(),
            medium: default_medium_multiplier(),
            high: default_high_multiplier(),
        }
    }
}

fn default_low_multiplier() -> f64 {
    2.0
}

fn default_medium_multiplier() -> f64 {
    3.0
}

fn default_high_multiplier() -> f64 {
    5.0
}

/// Two-stop gradient color pair, serialized as `["#from", "#to"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair(pub String, pub String);

impl ColorPair {
    pub fn new(from: &str, to: &str) -> Self {
        ColorPair(from.to_string(), to.to_string())
    }
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Per-layout canvas dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CanvasSizes {
    #[serde(default = "default_pc_size")]
    pub pc: CanvasSize,
    #[serde(default = "default_mobile_size")]
    pub mobile: CanvasSize,
}

impl CanvasSizes {
    pub fn for_layout(&self, layout: Layout) -> CanvasSize {
        match layout {
            Layout::Pc => self.pc,
            Layout::Mobile => self.mobile,
        }
    }
}

impl Default for CanvasSizes {
    fn default() -> Self {
        CanvasSizes {
            pc: default_pc_size(),
            mobile: default_mobile_size(),
        }
    }
}

fn default_pc_size() -> CanvasSize {
    CanvasSize {
        width: 900,
        height: 600,
    }
}

fn default_mobile_size() -> CanvasSize {
    CanvasSize {
        width: 430,
        height: 780,
    }
}

/// The mutable session record. One per framework instance, mutated in place
/// for the life of the session, never persisted by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub balance: f64,
    pub bet_amount: f64,
    pub max_bet: f64,
    pub risk_level: RiskLevel,
    pub is_spinning: bool,
    pub auto_play: bool,
    pub theme: String,
    pub layout: Layout,
    pub sound_enabled: bool,
}

impl SessionState {
    /// Label for the spin control, derived from the current flags.
    pub fn spin_button_label(&self) -> &'static str {
        if self.is_spinning {
            "SPINNING..."
        } else if self.auto_play {
            "AUTO SPIN"
        } else {
            "SPIN"
        }
    }
}

/// Shallow-merge patch for `update_state`. Absent fields are left untouched.
/// No range validation happens here; the named bet operations own clamping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub bet_amount: Option<f64>,
    #[serde(default)]
    pub max_bet: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub auto_play: Option<bool>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub sound_enabled: Option<bool>,
}

/// Outcome of one spin, produced by the game plugin and consumed once.
/// Extra fields are carried through untouched to `calculate_win` and the
/// win/loss handlers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpinResult {
    #[serde(default)]
    pub is_win: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SpinResult {
    pub fn win() -> Self {
        SpinResult {
            is_win: true,
            extra: serde_json::Map::new(),
        }
    }

    pub fn loss() -> Self {
        SpinResult {
            is_win: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn from_win(is_win: bool) -> Self {
        SpinResult {
            is_win,
            extra: serde_json::Map::new(),
        }
    }
}

/// Framework configuration passed from the host, usually as JSON.
/// Every field has a default so `{}` configures a working instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkConfig {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    #[serde(default = "default_initial_bet")]
    pub initial_bet: f64,
    #[serde(default = "default_max_bet")]
    pub max_bet: f64,
    #[serde(default)]
    pub risk_multipliers: RiskMultipliers,
    #[serde(default)]
    pub default_risk_level: RiskLevel,
    #[serde(default = "default_theme")]
    pub default_theme: String,
    /// Theme name to gradient color pair. Unknown themes fall back to the
    /// built-in pair at draw time.
    #[serde(default = "default_theme_colors")]
    pub theme_colors: HashMap<String, ColorPair>,
    #[serde(default)]
    pub default_layout: Layout,
    #[serde(default)]
    pub canvas_sizes: CanvasSizes,
    /// Delay before an auto-play spin follows a settled one.
    #[serde(default = "default_autoplay_delay")]
    pub autoplay_delay_ms: u32,
    /// Delay before the post-settlement redraw clears win/loss overlays.
    #[serde(default = "default_settle_redraw_delay")]
    pub settle_redraw_delay_ms: u32,
    /// Win probability used when the plugin supplies no spin logic, and when
    /// a failing spin call is replaced with a substitute outcome.
    #[serde(default = "default_win_probability")]
    pub default_win_probability: f64,
    #[serde(default)]
    pub debug_grid: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Seed for the session RNG. Fixed default keeps prototypes reproducible.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Title shown on the built-in fallback screen.
    #[serde(default = "default_title")]
    pub title: String,
}

impl FrameworkConfig {
    /// Parse a configuration from JSON. Absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, crate::error::FrameworkError> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::FrameworkError::InvalidConfig(e.to_string()))
    }

    /// Initial session record derived from this configuration.
    pub fn initial_state(&self) -> SessionState {
        SessionState {
            balance: self.initial_balance,
            bet_amount: self.initial_bet,
            max_bet: self.max_bet,
            risk_level: self.default_risk_level,
            is_spinning: false,
            auto_play: false,
            theme: self.default_theme.clone(),
            layout: self.default_layout,
            sound_enabled: self.sound_enabled,
        }
    }
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        FrameworkConfig {
            initial_balance: default_initial_balance(),
            initial_bet: default_initial_bet(),
            max_bet: default_max_bet(),
            risk_multipliers: RiskMultipliers::default(),
            default_risk_level: RiskLevel::default(),
            default_theme: default_theme(),
            theme_colors: default_theme_colors(),
            default_layout: Layout::default(),
            canvas_sizes: CanvasSizes::default(),
            autoplay_delay_ms: default_autoplay_delay(),
            settle_redraw_delay_ms: default_settle_redraw_delay(),
            default_win_probability: default_win_probability(),
            debug_grid: false,
            sound_enabled: true,
            rng_seed: None,
            title: default_title(),
        }
    }
}

fn default_initial_balance() -> f64 {
    1000.0
}

fn default_initial_bet() -> f64 {
    10.0
}

fn default_max_bet() -> f64 {
    100.0
}

fn default_theme() -> String {
    "classic".to_string()
}

fn default_theme_colors() -> HashMap<String, ColorPair> {
    let mut colors = HashMap::new();
    colors.insert("classic".to_string(), ColorPair::new("#1a2a6c", "#2a4858"));
    colors.insert("neon".to_string(), ColorPair::new("#0f0c29", "#24243e"));
    colors.insert("sunset".to_string(), ColorPair::new("#b31237", "#f2a65a"));
    colors
}

fn default_autoplay_delay() -> u32 {
    1500
}

fn default_settle_redraw_delay() -> u32 {
    2000
}

fn default_win_probability() -> f64 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "SPINLAB".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_configures_working_instance() {
        let config: FrameworkConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.initial_balance, 1000.0);
        assert_eq!(config.initial_bet, 10.0);
        assert_eq!(config.max_bet, 100.0);
        assert_eq!(config.risk_multipliers.medium, 3.0);
        assert_eq!(config.autoplay_delay_ms, 1500);
        assert_eq!(config.settle_redraw_delay_ms, 2000);
        assert!(config.theme_colors.contains_key("classic"));
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config: FrameworkConfig =
            serde_json::from_str(r#"{"initial_balance": 500, "default_risk_level": "high"}"#)
                .unwrap();
        assert_eq!(config.initial_balance, 500.0);
        assert_eq!(config.default_risk_level, RiskLevel::High);
        assert_eq!(config.initial_bet, 10.0);
    }

    #[test]
    fn bad_config_json_is_a_typed_error() {
        let err = FrameworkConfig::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn spin_result_extra_fields_survive_round_trip() {
        let json = r#"{"is_win": true, "reel": [1, 2, 3], "combo": "triple"}"#;
        let result: SpinResult = serde_json::from_str(json).unwrap();
        assert!(result.is_win);
        assert_eq!(result.extra["combo"], "triple");

        let back = serde_json::to_string(&result).unwrap();
        let again: SpinResult = serde_json::from_str(&back).unwrap();
        assert_eq!(again.extra["reel"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn spin_result_missing_fields_is_definite_loss() {
        let result: SpinResult = serde_json::from_str("{}").unwrap();
        assert!(!result.is_win);
    }

    #[test]
    fn spin_button_label_tracks_flags() {
        let mut state = FrameworkConfig::default().initial_state();
        assert_eq!(state.spin_button_label(), "SPIN");
        state.auto_play = true;
        assert_eq!(state.spin_button_label(), "AUTO SPIN");
        state.is_spinning = true;
        assert_eq!(state.spin_button_label(), "SPINNING...");
    }

    #[test]
    fn risk_level_parse_rejects_unknown() {
        assert_eq!(RiskLevel::parse("medium"), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::parse("extreme"), None);
    }
}
