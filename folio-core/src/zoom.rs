//! Zoom stepping within configured bounds

use crate::config::ZoomConfig;
use crate::error::{Result, ViewError};
use crate::state::ViewState;

/// An applied zoom change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomChange {
    pub from: f32,
    pub to: f32,
}

/// Step the zoom up by one increment, saturating at `config.max`.
///
/// Returns `Ok(None)` when the zoom is already at the bound.
pub fn zoom_in(state: &mut ViewState, config: &ZoomConfig) -> Result<Option<ZoomChange>> {
    ensure_zoom_allowed(state, config, "zoom in")?;
    let target = (state.zoom + config.step).min(config.max);
    Ok(apply(state, target))
}

/// Step the zoom down by one increment, saturating at `config.min`.
pub fn zoom_out(state: &mut ViewState, config: &ZoomConfig) -> Result<Option<ZoomChange>> {
    ensure_zoom_allowed(state, config, "zoom out")?;
    let target = (state.zoom - config.step).max(config.min);
    Ok(apply(state, target))
}

/// Return to the default zoom
pub fn zoom_reset(state: &mut ViewState, config: &ZoomConfig) -> Result<Option<ZoomChange>> {
    ensure_zoom_allowed(state, config, "reset zoom")?;
    Ok(apply(state, config.default))
}

fn ensure_zoom_allowed(
    state: &ViewState,
    config: &ZoomConfig,
    operation: &'static str,
) -> Result<()> {
    if state.is_continuous_mode() && !config.continuous_stepping {
        return Err(ViewError::InvalidModeCombination { operation });
    }
    Ok(())
}

fn apply(state: &mut ViewState, target: f32) -> Option<ZoomChange> {
    if target == state.zoom {
        return None;
    }
    let change = ZoomChange {
        from: state.zoom,
        to: target,
    };
    state.zoom = target;
    tracing::debug!(from = change.from, to = change.to, "zoom changed");
    Some(change)
}
