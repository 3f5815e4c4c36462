//! Layout mode state machine
//!
//! Transitions between single-page, double-page (with or without a cover
//! page) and continuous layouts. Every transition re-anchors the current
//! page index so the spread shown afterwards contains the page the reader
//! was looking at.

use crate::config::ZoomConfig;
use crate::error::{Result, ViewError};
use crate::spread::normalize_index;
use crate::state::ViewState;

/// How pages are laid out in the viewer.
///
/// Continuous and double-page are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMode {
    #[default]
    Single,
    Double {
        cover: bool,
    },
    Continuous,
}

impl LayoutMode {
    pub fn is_double_page(self) -> bool {
        matches!(self, Self::Double { .. })
    }

    pub fn is_cover_page(self) -> bool {
        matches!(self, Self::Double { cover: true })
    }

    pub fn is_continuous(self) -> bool {
        matches!(self, Self::Continuous)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "single page",
            Self::Double { cover: false } => "double page",
            Self::Double { cover: true } => "double page with cover",
            Self::Continuous => "continuous",
        }
    }
}

/// What a layout transition requires from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEffect {
    /// Mode already had the target shape
    Unchanged,
    /// Re-render the visible spread
    RenderSpread,
    /// Only the remembered cover preference moved; the visible spread is unchanged
    PreferenceOnly,
    /// Entered continuous mode: render every page, then scroll to the current one
    RenderDocument,
}

/// Flip between single-page and double-page layout.
///
/// Rejected in continuous mode.
pub fn toggle_double_page(state: &mut ViewState) -> Result<LayoutEffect> {
    match state.layout {
        LayoutMode::Continuous => Err(ViewError::InvalidModeCombination {
            operation: "toggle double-page mode",
        }),
        LayoutMode::Single => Ok(enter_double(state)),
        LayoutMode::Double { .. } => Ok(enter_single(state)),
    }
}

/// Flip the cover page on or off.
///
/// In double-page mode the spread is re-anchored; in single-page mode only
/// the preference for the next double-page switch changes.
pub fn toggle_cover_page(state: &mut ViewState) -> Result<LayoutEffect> {
    match state.layout {
        LayoutMode::Continuous => Err(ViewError::InvalidModeCombination {
            operation: "toggle cover-page mode",
        }),
        LayoutMode::Single => {
            state.cover_page = !state.cover_page;
            tracing::debug!(cover = state.cover_page, "cover preference changed");
            Ok(LayoutEffect::PreferenceOnly)
        }
        LayoutMode::Double { cover } => Ok(set_cover(state, !cover)),
    }
}

/// Enter continuous mode, or return to single-page layout if already there
pub fn toggle_continuous(state: &mut ViewState, zoom: &ZoomConfig) -> LayoutEffect {
    if state.layout.is_continuous() {
        enter_single(state)
    } else {
        enter_continuous(state, zoom)
    }
}

/// Move to `target`, whatever the current layout.
///
/// Idempotent: asking for the current shape reports [`LayoutEffect::Unchanged`].
pub fn set_layout(state: &mut ViewState, target: LayoutMode, zoom: &ZoomConfig) -> LayoutEffect {
    if state.layout == target {
        return LayoutEffect::Unchanged;
    }
    match target {
        LayoutMode::Single => enter_single(state),
        LayoutMode::Double { cover } => {
            if state.layout.is_double_page() {
                set_cover(state, cover)
            } else {
                state.cover_page = cover;
                if state.layout.is_continuous() {
                    enter_single(state);
                }
                enter_double(state)
            }
        }
        LayoutMode::Continuous => enter_continuous(state, zoom),
    }
}

fn enter_single(state: &mut ViewState) -> LayoutEffect {
    let previous = state.layout;
    if previous == LayoutMode::Single {
        return LayoutEffect::Unchanged;
    }
    if previous.is_continuous() {
        if let Some(zoom) = state.zoom_before_continuous.take() {
            state.zoom = zoom;
        }
    }
    state.layout = LayoutMode::Single;
    log_transition(previous, state);
    LayoutEffect::RenderSpread
}

fn enter_double(state: &mut ViewState) -> LayoutEffect {
    let previous = state.layout;
    let target = LayoutMode::Double {
        cover: state.cover_page,
    };
    if previous == target {
        return LayoutEffect::Unchanged;
    }
    state.layout = target;
    reanchor(state);
    log_transition(previous, state);
    LayoutEffect::RenderSpread
}

/// Switching into cover mode moves an even, nonzero anchor back by one;
/// switching out of it moves an odd anchor back by one. Both are exactly
/// the canonical index of the new pairing.
fn set_cover(state: &mut ViewState, cover: bool) -> LayoutEffect {
    let previous = state.layout;
    state.cover_page = cover;
    let target = LayoutMode::Double { cover };
    if previous == target {
        return LayoutEffect::Unchanged;
    }
    state.layout = target;
    reanchor(state);
    log_transition(previous, state);
    LayoutEffect::RenderSpread
}

fn enter_continuous(state: &mut ViewState, zoom: &ZoomConfig) -> LayoutEffect {
    let previous = state.layout;
    if previous.is_continuous() {
        return LayoutEffect::Unchanged;
    }
    state.zoom_before_continuous = Some(state.zoom);
    state.zoom = zoom.continuous;
    state.layout = LayoutMode::Continuous;
    log_transition(previous, state);
    LayoutEffect::RenderDocument
}

fn reanchor(state: &mut ViewState) {
    state.current_page_index = normalize_index(
        state.page_count,
        state.current_page_index,
        state.layout.is_double_page(),
        state.layout.is_cover_page(),
    );
}

fn log_transition(previous: LayoutMode, state: &ViewState) {
    tracing::debug!(
        from = previous.name(),
        to = state.layout.name(),
        page_index = state.current_page_index,
        zoom = state.zoom,
        "layout changed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spread::Spread;
    use pretty_assertions::assert_eq;

    fn state_at(page_count: usize, index: usize) -> ViewState {
        let mut state = ViewState::new(page_count, &ZoomConfig::default());
        state.current_page_index = index;
        state
    }

    #[test]
    fn test_single_to_double_reanchors_odd_index() {
        let mut state = state_at(10, 5);
        assert_eq!(toggle_double_page(&mut state), Ok(LayoutEffect::RenderSpread));
        assert_eq!(state.layout, LayoutMode::Double { cover: false });
        assert_eq!(state.current_page_index, 4);
        assert_eq!(state.spread(), Spread::pair(4, 5));
    }

    #[test]
    fn test_single_to_double_uses_cover_preference() {
        let mut state = state_at(10, 4);
        assert_eq!(toggle_cover_page(&mut state), Ok(LayoutEffect::PreferenceOnly));
        assert_eq!(state.layout, LayoutMode::Single);

        toggle_double_page(&mut state).unwrap();
        assert_eq!(state.layout, LayoutMode::Double { cover: true });
        assert_eq!(state.current_page_index, 3);
        assert_eq!(state.spread(), Spread::pair(3, 4));
    }

    #[test]
    fn test_into_cover_shifts_even_nonzero_index_back() {
        let mut state = state_at(10, 4);
        toggle_double_page(&mut state).unwrap();
        toggle_cover_page(&mut state).unwrap();
        assert_eq!(state.current_page_index, 3);
        assert_eq!(state.spread(), Spread::pair(3, 4));
    }

    #[test]
    fn test_into_cover_keeps_first_page() {
        let mut state = state_at(10, 0);
        toggle_double_page(&mut state).unwrap();
        toggle_cover_page(&mut state).unwrap();
        assert_eq!(state.current_page_index, 0);
        assert_eq!(state.spread(), Spread::cover(0));
    }

    #[test]
    fn test_out_of_cover_shifts_odd_index_back() {
        let mut state = state_at(10, 3);
        set_layout(
            &mut state,
            LayoutMode::Double { cover: true },
            &ZoomConfig::default(),
        );
        assert_eq!(state.current_page_index, 3);

        toggle_cover_page(&mut state).unwrap();
        assert_eq!(state.layout, LayoutMode::Double { cover: false });
        assert_eq!(state.current_page_index, 2);
        assert_eq!(state.spread(), Spread::pair(2, 3));
    }

    #[test]
    fn test_double_to_single_keeps_anchor() {
        let mut state = state_at(10, 6);
        toggle_double_page(&mut state).unwrap();
        toggle_double_page(&mut state).unwrap();
        assert_eq!(state.layout, LayoutMode::Single);
        assert_eq!(state.current_page_index, 6);
        assert_eq!(state.spread(), Spread::single(6));
    }

    #[test]
    fn test_continuous_forces_single_column_and_zoom() {
        let zoom = ZoomConfig::default();
        let mut state = state_at(10, 4);
        state.zoom = 2.0;
        toggle_double_page(&mut state).unwrap();

        assert_eq!(toggle_continuous(&mut state, &zoom), LayoutEffect::RenderDocument);
        assert!(state.is_continuous_mode());
        assert!(!state.is_double_page_mode());
        assert_eq!(state.zoom, 1.0);

        assert_eq!(toggle_continuous(&mut state, &zoom), LayoutEffect::RenderSpread);
        assert_eq!(state.layout, LayoutMode::Single);
        assert_eq!(state.zoom, 2.0);
        assert_eq!(state.spread(), Spread::single(4));
    }

    #[test]
    fn test_double_page_toggles_rejected_in_continuous_mode() {
        let mut state = state_at(10, 4);
        toggle_continuous(&mut state, &ZoomConfig::default());
        let before = state.clone();

        assert!(matches!(
            toggle_double_page(&mut state),
            Err(ViewError::InvalidModeCombination { .. })
        ));
        assert!(matches!(
            toggle_cover_page(&mut state),
            Err(ViewError::InvalidModeCombination { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_set_layout_is_idempotent() {
        let zoom = ZoomConfig::default();
        let mut state = state_at(10, 5);

        let target = LayoutMode::Double { cover: true };
        assert_eq!(set_layout(&mut state, target, &zoom), LayoutEffect::RenderSpread);
        let after_first = state.clone();
        assert_eq!(set_layout(&mut state, target, &zoom), LayoutEffect::Unchanged);
        assert_eq!(state, after_first);

        assert_eq!(
            set_layout(&mut state, LayoutMode::Continuous, &zoom),
            LayoutEffect::RenderDocument
        );
        assert_eq!(
            set_layout(&mut state, LayoutMode::Continuous, &zoom),
            LayoutEffect::Unchanged
        );
    }

    #[test]
    fn test_set_layout_from_continuous_to_double() {
        let zoom = ZoomConfig::default();
        let mut state = state_at(10, 5);
        set_layout(&mut state, LayoutMode::Continuous, &zoom);

        set_layout(&mut state, LayoutMode::Double { cover: false }, &zoom);
        assert_eq!(state.layout, LayoutMode::Double { cover: false });
        assert_eq!(state.zoom, zoom.default);
        assert_eq!(state.current_page_index, 4);
    }

    #[test]
    fn test_round_trips_restore_spread_when_parity_unaffected() {
        let zoom = ZoomConfig::default();

        // Double -> Single -> Double with an even anchor
        let mut state = state_at(10, 4);
        toggle_double_page(&mut state).unwrap();
        let before = state.spread();
        toggle_double_page(&mut state).unwrap();
        toggle_double_page(&mut state).unwrap();
        assert_eq!(state.spread(), before);

        // Cover -> NonCover -> Cover on the cover page
        let mut state = state_at(10, 0);
        set_layout(&mut state, LayoutMode::Double { cover: true }, &zoom);
        let before = state.spread();
        toggle_cover_page(&mut state).unwrap();
        toggle_cover_page(&mut state).unwrap();
        assert_eq!(state.spread(), before);

        // Single -> Continuous -> Single
        let mut state = state_at(10, 7);
        let before = state.spread();
        toggle_continuous(&mut state, &zoom);
        toggle_continuous(&mut state, &zoom);
        assert_eq!(state.spread(), before);
    }
}
