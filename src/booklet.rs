//! Booklet allocation - Distributes purchased cases across the pages of a
//! fixed account's booklet.
//!
//! The allocator is a pure function over the page layout: existing pages
//! are topped up in ascending order before any new page is created, and no
//! page beyond the eighth ever exists. Cases that cannot be placed once
//! page 8 is full are reported back as `leftover` so the caller can reject
//! the originating deposit without committing anything.

/// Pages in a complete booklet.
pub const MAX_PAGES: u32 = 8;
/// Cases on a single page.
pub const CASES_PER_PAGE: u32 = 31;
/// Total capacity of a booklet (8 x 31).
pub const MAX_CASES: u32 = MAX_PAGES * CASES_PER_PAGE;

/// Fill level of one booklet page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFill {
    /// Position in the booklet, 1 through 8
    pub page_number: u32,
    /// Cases stamped on the page, 0 through 31
    pub filled_cases: u32,
}

/// Result of an allocation run: the full page layout after placing as many
/// cases as capacity allows, and the count that did not fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub pages: Vec<PageFill>,
    pub leftover: u32,
}

impl Allocation {
    /// Total cases stamped across all pages of the resulting layout.
    pub fn total_cases(&self) -> u32 {
        self.pages.iter().map(|p| p.filled_cases).sum()
    }
}

/// Places `cases_to_add` into the booklet described by `pages`.
///
/// Existing pages with room are filled first in ascending page order, each
/// absorbing up to its remaining capacity. New pages are then created one
/// at a time after the current highest page number, never beyond page 8.
/// The input layout is not required to be sorted; the output always is.
///
/// Deterministic: the same starting layout and case count always produce
/// the same result, and splitting a count across several calls converges
/// on the same final layout as a single call.
pub fn allocate(pages: &[PageFill], cases_to_add: u32) -> Allocation {
    let mut layout: Vec<PageFill> = pages.to_vec();
    layout.sort_by_key(|p| p.page_number);

    let mut remaining = cases_to_add;

    // Top up existing pages first.
    for page in &mut layout {
        if remaining == 0 {
            break;
        }
        let room = CASES_PER_PAGE.saturating_sub(page.filled_cases);
        let absorbed = remaining.min(room);
        page.filled_cases += absorbed;
        remaining -= absorbed;
    }

    // Open new pages after the current last one.
    while remaining > 0 {
        let last_page = layout.last().map_or(0, |p| p.page_number);
        if last_page >= MAX_PAGES {
            break;
        }
        let absorbed = remaining.min(CASES_PER_PAGE);
        layout.push(PageFill {
            page_number: last_page + 1,
            filled_cases: absorbed,
        });
        remaining -= absorbed;
    }

    Allocation {
        pages: layout,
        leftover: remaining,
    }
}
