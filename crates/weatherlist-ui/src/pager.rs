//! Windowed pagination over a list of known length.
//!
//! Everything here is a pure function of `(total_items, items_per_page, current_page)`;
//! the list model recomputes the window on every render instead of storing it.

use std::ops::Range;

/// Page numbers shown at once when there are more pages than this.
pub const WINDOW_WIDTH: usize = 5;

/// The visible part of a paginated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Requested page after clamping into `1..=total_pages`.
    pub current_page: usize,
    pub total_pages: usize,
    /// Item indices on the current page, already clipped to the list length.
    pub slice: Range<usize>,
    /// Page buttons to render, in order.
    pub page_numbers: Vec<usize>,
    pub can_prev: bool,
    pub can_next: bool,
}

/// Number of pages needed for `total_items`; never less than one.
pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    total_items.div_ceil(items_per_page.max(1)).max(1)
}

/// Pull `page` into `1..=total_pages`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn compute_window(total_items: usize, items_per_page: usize, current_page: usize) -> PageWindow {
    let items_per_page = items_per_page.max(1);
    let total_pages = total_pages(total_items, items_per_page);
    let current_page = clamp_page(current_page, total_pages);

    let (low, high) = if total_pages <= WINDOW_WIDTH {
        (1, total_pages)
    } else if current_page <= 3 {
        (1, WINDOW_WIDTH)
    } else if current_page + 2 >= total_pages {
        (total_pages - (WINDOW_WIDTH - 1), total_pages)
    } else {
        (current_page - 2, current_page + 2)
    };

    let start = ((current_page - 1) * items_per_page).min(total_items);
    let end = (current_page * items_per_page).min(total_items);

    PageWindow {
        current_page,
        total_pages,
        slice: start..end,
        page_numbers: (low..=high).collect(),
        can_prev: current_page > 1,
        can_next: current_page < total_pages,
    }
}
