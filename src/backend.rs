// Secondary backend acquisition as an ordered list of construction
// strategies. The capability probe is computed by the host once and passed
// in; nothing here consults ambient global state.

use log::{debug, warn};

use crate::error::BackendError;
use crate::surface::DrawSurface;

/// Host-supplied capability probe for the enhanced renderer, cached on the
/// dispatcher for the life of the session.
#[derive(Debug, Clone, Default)]
pub struct BackendProbe {
    /// Whether the enhanced rendering library was detected at all.
    pub enhanced_available: bool,
    /// Detected library version, when the host could read one.
    pub version: Option<String>,
}

/// One way of constructing the secondary drawing surface. Strategies are
/// attempted in order; the first success wins.
pub type BackendStrategy =
    Box<dyn Fn(&BackendProbe) -> Result<Box<dyn DrawSurface>, BackendError>>;

/// Attempt each strategy in order. Exhaustion means the session runs on the
/// primary surface alone.
pub(crate) fn init_secondary(
    strategies: &[BackendStrategy],
    probe: &BackendProbe,
) -> Option<Box<dyn DrawSurface>> {
    for (index, strategy) in strategies.iter().enumerate() {
        match strategy(probe) {
            Ok(surface) => {
                debug!("secondary backend initialized via strategy {index}");
                return Some(surface);
            }
            Err(e) => warn!("secondary backend strategy {index} failed: {e}"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn failing(reason: &'static str) -> BackendStrategy {
        Box::new(move |_| Err(BackendError::Construction(reason.to_string())))
    }

    fn succeeding() -> BackendStrategy {
        Box::new(|_| Ok(Box::new(RecordingSurface::new(100, 100)) as Box<dyn DrawSurface>))
    }

    #[test]
    fn first_success_wins() {
        let strategies = vec![failing("modern api"), succeeding(), failing("legacy api")];
        let probe = BackendProbe::default();
        assert!(init_secondary(&strategies, &probe).is_some());
    }

    #[test]
    fn exhaustion_yields_none() {
        let strategies = vec![failing("modern api"), failing("legacy api")];
        let probe = BackendProbe::default();
        assert!(init_secondary(&strategies, &probe).is_none());
    }

    #[test]
    fn empty_strategy_list_yields_none() {
        assert!(init_secondary(&[], &BackendProbe::default()).is_none());
    }

    #[test]
    fn strategies_see_the_probe() {
        let strategies: Vec<BackendStrategy> = vec![Box::new(|probe: &BackendProbe| {
            if probe.enhanced_available {
                Ok(Box::new(RecordingSurface::new(1, 1)) as Box<dyn DrawSurface>)
            } else {
                Err(BackendError::Unavailable("not detected".to_string()))
            }
        })];

        assert!(init_secondary(&strategies, &BackendProbe::default()).is_none());
        let probe = BackendProbe {
            enhanced_available: true,
            version: Some("8.4.1".to_string()),
        };
        assert!(init_secondary(&strategies, &probe).is_some());
    }
}
