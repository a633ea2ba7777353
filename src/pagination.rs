/// Pagination stage
///
/// Pages are 1-based. Slicing never fails: a page past the end (or page 0)
/// is simply empty, and it is up to the navigation controls to keep the user
/// in range.

use serde::Serialize;

/// Number of page buttons shown around the current page.
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Total number of pages needed for `total_items`.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// The slice of `items` shown on `page`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Page numbers to display as buttons.
///
/// The window is centred on `current_page` unless that would run past either
/// end, in which case it is pinned to the first or last `max_buttons` pages.
pub fn page_window(current_page: usize, total_pages: usize, max_buttons: usize) -> Vec<usize> {
    if total_pages <= max_buttons {
        return (1..=total_pages).collect();
    }
    if max_buttons == 0 {
        return Vec::new();
    }

    let before = max_buttons / 2;
    let after = max_buttons.div_ceil(2) - 1;

    let (start, end) = if current_page <= before {
        (1, max_buttons)
    } else if current_page + after >= total_pages {
        (total_pages - max_buttons + 1, total_pages)
    } else {
        (current_page - before, current_page + after)
    };
    (start..=end).collect()
}

/// State of the pagination controls for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub current_page: usize,
    pub total_pages: usize,
    pub buttons: Vec<usize>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageControls {
    pub fn new(current_page: usize, total_items: usize, page_size: usize) -> Self {
        let total = total_pages(total_items, page_size);
        PageControls {
            current_page,
            total_pages: total,
            buttons: page_window(current_page, total, MAX_PAGE_BUTTONS),
            has_previous: current_page > 1,
            has_next: current_page < total,
        }
    }
}

/// One page of an ordered, filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow<T> {
    pub total_items: usize,
    pub page_size: usize,
    pub current_page: usize,
    pub visible: Vec<T>,
}

impl<T: Clone> PageWindow<T> {
    pub fn from_items(items: &[T], current_page: usize, page_size: usize) -> Self {
        PageWindow {
            total_items: items.len(),
            page_size,
            current_page,
            visible: paginate(items, current_page, page_size).to_vec(),
        }
    }
}

impl<T> PageWindow<T> {
    pub fn controls(&self) -> PageControls {
        PageControls::new(self.current_page, self.total_items, self.page_size)
    }
}
