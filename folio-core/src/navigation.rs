//! Page navigation
//!
//! Relative moves step by one page in single-page and continuous layouts and
//! by one spread in double-page layouts. All moves start from the canonical
//! index, so a spread is never split.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, ViewError};
use crate::layout::LayoutMode;
use crate::spread::normalize_index;
use crate::state::ViewState;

/// A change of the current page index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMove {
    pub from: usize,
    pub to: usize,
}

/// Step back one page or spread. No-op on the first page.
pub fn previous(state: &mut ViewState) -> Option<PageMove> {
    if state.page_count == 0 || state.current_page_index == 0 {
        return None;
    }
    let base = canonical(state, state.current_page_index);
    let target = match state.layout {
        LayoutMode::Single | LayoutMode::Continuous => base - 1,
        // From the first pair (1,2) the only way back is the cover
        LayoutMode::Double { cover: true } if base <= 1 => 0,
        LayoutMode::Double { .. } => base.saturating_sub(2),
    };
    move_to(state, canonical(state, target))
}

/// Step forward one page or spread.
///
/// No-op on the last page, and in double-page layouts whenever the visible
/// spread already shows the last page.
pub fn next(state: &mut ViewState) -> Option<PageMove> {
    let last = state.last_page_index()?;
    if state.current_page_index >= last {
        return None;
    }
    let base = canonical(state, state.current_page_index);
    let target = match state.layout {
        LayoutMode::Single | LayoutMode::Continuous => base + 1,
        LayoutMode::Double { cover: true } if base == 0 => 1,
        LayoutMode::Double { .. } => base + 2,
    };
    if target > last {
        return None;
    }
    move_to(state, canonical(state, target))
}

/// Jump to the first page
pub fn first(state: &mut ViewState) -> Option<PageMove> {
    if state.page_count == 0 {
        return None;
    }
    move_to(state, 0)
}

/// Jump to the spread holding the last page
pub fn last(state: &mut ViewState) -> Option<PageMove> {
    let last = state.last_page_index()?;
    move_to(state, canonical(state, last))
}

/// Go to a 1-based page number.
///
/// `offset` is added before the bounds check (see [`page_offset_from_name`]).
/// Out-of-range requests leave the state untouched.
pub fn go_to(
    state: &mut ViewState,
    requested_page_number: i64,
    offset: i64,
) -> Result<Option<PageMove>> {
    let effective = requested_page_number.saturating_add(offset);
    if effective < 1 || effective > state.page_count as i64 {
        return Err(ViewError::OutOfRange {
            requested: effective,
            page_count: state.page_count,
        });
    }
    let index = (effective - 1) as usize;
    Ok(move_to(state, canonical(state, index)))
}

/// Page offset encoded in a document name as a trailing `_<digits>` suffix.
///
/// `"scan_12.pdf"` yields 12, `"minutes__3"` yields 3, `"report.pdf"` yields
/// nothing. Only consulted when `navigation.filename_page_offset` is enabled.
pub fn page_offset_from_name(display_name: &str) -> Option<i64> {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    let suffix = SUFFIX.get_or_init(|| Regex::new(r"_+(\d+)$").expect("valid suffix pattern"));

    let stem = Path::new(display_name).file_stem()?.to_str()?;
    let digits = suffix.captures(stem)?.get(1)?;
    digits.as_str().parse().ok()
}

/// Parse the text of a go-to field.
///
/// Accepts whole or decimal numbers; decimals are truncated toward zero.
pub fn parse_page_number(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if let Ok(number) = trimmed.parse::<i64>() {
        return Ok(number);
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number.trunc() as i64),
        _ => Err(ViewError::InvalidPageNumber(trimmed.to_string())),
    }
}

fn canonical(state: &ViewState, index: usize) -> usize {
    normalize_index(
        state.page_count,
        index,
        state.layout.is_double_page(),
        state.layout.is_cover_page(),
    )
}

fn move_to(state: &mut ViewState, target: usize) -> Option<PageMove> {
    let from = state.current_page_index;
    if target == from {
        return None;
    }
    state.current_page_index = target;
    tracing::debug!(from, to = target, layout = state.layout.name(), "page changed");
    Some(PageMove { from, to: target })
}
