//! Page-window selection for the manual pagination footer.
//!
//! Keeps a constant-width window of page buttons around the current page
//! while always anchoring the first and last page, with an ellipsis marker
//! standing in for each hidden run.

use std::fmt;

/// Width of the window of pages shown around the current page.
pub const MAX_VISIBLE_PAGES: u32 = 3;

/// A single slot in the pagination footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Page(n) => write!(f, "{n}"),
            PageToken::Ellipsis => f.write_str("…"),
        }
    }
}

/// Compute the ordered page tokens for `current` out of `total` pages.
///
/// `current` is clamped into `1..=total`. `total == 0` yields no tokens.
///
/// ```
/// use reelfeed::feed::{page_window, PageToken::{Ellipsis, Page}};
///
/// assert_eq!(
///     page_window(5, 10),
///     vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
/// );
/// ```
pub fn page_window(current: u32, total: u32) -> Vec<PageToken> {
    if total == 0 {
        return Vec::new();
    }

    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageToken::Page).collect();
    }

    let current = current.clamp(1, total);
    let last_inner = total - 1;

    let mut start = current.saturating_sub(1).max(2);
    let mut end = current.saturating_add(1).min(last_inner);

    // Hold the window at full width when it runs into either edge.
    if current <= 2 {
        end = (MAX_VISIBLE_PAGES - 1).min(last_inner);
    } else if current >= last_inner {
        start = (total - (MAX_VISIBLE_PAGES - 2)).max(2);
    }

    let mut tokens = Vec::with_capacity(MAX_VISIBLE_PAGES as usize + 4);
    tokens.push(PageToken::Page(1));

    if start > 2 {
        tokens.push(PageToken::Ellipsis);
    }

    tokens.extend((start..=end).map(PageToken::Page));

    if end < last_inner {
        tokens.push(PageToken::Ellipsis);
    }

    tokens.push(PageToken::Page(total));
    tokens
}

/// Everything the pagination footer needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNav {
    pub tokens: Vec<PageToken>,
    pub current: u32,
    pub total: u32,
    pub can_prev: bool,
    pub can_next: bool,
}

impl PageNav {
    /// Returns `None` when there is at most one page, in which case the
    /// footer is not drawn at all.
    pub fn new(current: u32, total: u32) -> Option<Self> {
        if total <= 1 {
            return None;
        }

        let current = current.clamp(1, total);
        Some(Self {
            tokens: page_window(current, total),
            current,
            total,
            can_prev: current > 1,
            can_next: current < total,
        })
    }
}
