//! Spread computation
//!
//! Maps a page count, a current page index and the double-page/cover flags
//! to the pages that are visible side by side, and to the canonical index
//! that should be stored as the current page. Relative navigation is always
//! done from the canonical index so that stepping through spreads is stable.

/// One or two pages shown side by side.
///
/// An absent slot means nothing is drawn there: the trailing page of an odd
/// document, or the empty left slot beside the cover page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Spread {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Spread {
    pub const EMPTY: Spread = Spread {
        left: None,
        right: None,
    };

    pub fn single(page_index: usize) -> Self {
        Self {
            left: Some(page_index),
            right: None,
        }
    }

    pub fn pair(left: usize, right: usize) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// The cover page, drawn in the right slot with nothing beside it
    pub fn cover(page_index: usize) -> Self {
        Self {
            left: None,
            right: Some(page_index),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Populated slots, left to right
    pub fn pages(&self) -> impl Iterator<Item = usize> {
        self.left.into_iter().chain(self.right)
    }

    pub fn contains(&self, page_index: usize) -> bool {
        self.left == Some(page_index) || self.right == Some(page_index)
    }

    /// Label shown in the page indicator, 1-based (`"3-4 / 10"`, `"5 / 5"`)
    pub fn display_label(&self, page_count: usize) -> String {
        match (self.left, self.right) {
            (Some(left), Some(right)) => format!("{}-{} / {}", left + 1, right + 1, page_count),
            (Some(page), None) | (None, Some(page)) => format!("{} / {}", page + 1, page_count),
            (None, None) => format!("0 / {}", page_count),
        }
    }
}

/// Compute the visible spread for `current_page_index`.
///
/// An index past the end is clamped to the last page. A one-page document
/// always shows `{0, absent}`, even in cover mode.
pub fn compute_spread(
    page_count: usize,
    current_page_index: usize,
    is_double_page_mode: bool,
    is_cover_page_mode: bool,
) -> Spread {
    if page_count == 0 {
        return Spread::EMPTY;
    }
    if page_count == 1 {
        return Spread::single(0);
    }

    let current = current_page_index.min(page_count - 1);
    if !is_double_page_mode {
        return Spread::single(current);
    }

    if is_cover_page_mode && current == 0 {
        return Spread::cover(0);
    }

    let base = spread_base(current, is_cover_page_mode);
    Spread {
        left: Some(base),
        right: (base + 1 < page_count).then_some(base + 1),
    }
}

/// Canonical current index for the spread that contains `current_page_index`
pub fn normalize_index(
    page_count: usize,
    current_page_index: usize,
    is_double_page_mode: bool,
    is_cover_page_mode: bool,
) -> usize {
    if page_count == 0 {
        return 0;
    }

    let current = current_page_index.min(page_count - 1);
    if !is_double_page_mode || page_count == 1 {
        return current;
    }
    spread_base(current, is_cover_page_mode)
}

/// First page of the spread holding `index`.
///
/// Without a cover, spreads start on even indices. With a cover, page 0
/// stands alone and the rest pair up as (1,2), (3,4), ...
fn spread_base(index: usize, cover: bool) -> usize {
    match (cover, index) {
        (true, 0) => 0,
        (true, i) if i % 2 == 0 => i - 1,
        (true, i) => i,
        (false, i) if i % 2 == 0 => i,
        (false, i) => i - 1,
    }
}
