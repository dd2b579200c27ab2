use crate::catalog::Catalog;
use crate::config::Config;
use crate::feed::{
    DebounceGate, FeedController, FeedEvent, ScrollTrigger, Span, SubscriptionHandle,
    TrendingList,
};
use crate::util::MAX_QUERY_LENGTH;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Rows kept visible below the selection, so the sentinel shows up a little
/// before the user reaches the last result.
pub const SCROLL_OFF: usize = 3;

/// Seconds a status message stays on screen.
const STATUS_TTL_SECS: u64 = 3;

/// Application state for the TUI.
///
/// Owns the feed controller and the two resources that drive it: the
/// debounce gate between the search box and `reset`, and the scroll trigger
/// between the result list's sentinel row and `append`.
pub struct App {
    pub catalog: Arc<dyn Catalog>,
    pub feed: FeedController,
    pub trending: TrendingList,
    pub debounce: DebounceGate,
    pub scroll: ScrollTrigger<FeedController>,
    pub sentinel: SubscriptionHandle,
    pub feed_tx: mpsc::Sender<FeedEvent>,

    pub search_input: String,
    pub trending_count: usize,

    /// Index of the highlighted result.
    pub selected: usize,
    /// First result row drawn in the list viewport.
    pub list_offset: usize,
    /// Rows available to the list at the last render.
    pub list_height: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub spinner_frame: usize,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(config: &Config, catalog: Arc<dyn Catalog>, feed_tx: mpsc::Sender<FeedEvent>) -> Self {
        let feed = FeedController::new(Arc::clone(&catalog), feed_tx.clone());

        let mut scroll = ScrollTrigger::new(config.scroll_threshold);
        let sentinel = scroll.start(None, |feed: &mut FeedController| {
            feed.append();
        });

        Self {
            catalog,
            feed,
            trending: TrendingList::default(),
            debounce: DebounceGate::new(config.debounce()),
            scroll,
            sentinel,
            feed_tx,
            search_input: String::new(),
            trending_count: config.trending_count,
            selected: 0,
            list_offset: 0,
            list_height: 0,
            status_message: None,
            spinner_frame: 0,
            needs_redraw: true,
        }
    }

    /// Kick off the initial listing and the trending strip.
    pub fn start(&mut self, initial_query: &str) {
        self.search_input = initial_query.to_string();
        self.trending.load(
            Arc::clone(&self.catalog),
            self.trending_count,
            self.feed_tx.clone(),
        );
        self.reset_feed(initial_query.to_string());
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ------------------------------------------------------------------------
    // Search input
    // ------------------------------------------------------------------------

    pub fn push_char(&mut self, c: char) {
        if self.search_input.chars().count() >= MAX_QUERY_LENGTH {
            self.set_status(format!("Search query too long (max {MAX_QUERY_LENGTH} chars)"));
            return;
        }
        self.search_input.push(c);
        self.debounce.push(self.search_input.clone());
    }

    pub fn pop_char(&mut self) {
        if self.search_input.pop().is_some() {
            self.debounce.push(self.search_input.clone());
        }
    }

    pub fn clear_input(&mut self) {
        if !self.search_input.is_empty() {
            self.search_input.clear();
            self.debounce.push(String::new());
        }
    }

    /// Send the pending query now instead of waiting for the quiet period.
    pub fn submit_input(&mut self) {
        self.debounce.cancel();
        self.reset_feed(self.search_input.clone());
    }

    /// Re-run the current query from page 1, e.g. after a failed fetch.
    pub fn retry(&mut self) {
        self.debounce.cancel();
        self.search_input = self.feed.state().query.clone();
        self.reset_feed(self.search_input.clone());
    }

    /// Handle a query emitted by the debounce gate.
    pub fn on_settled_query(&mut self, query: String) {
        if query == self.feed.state().query && !self.feed.state().loading {
            tracing::trace!(query = %query, "Settled query unchanged, skipping reset");
            return;
        }
        self.reset_feed(query);
    }

    fn reset_feed(&mut self, query: String) {
        self.selected = 0;
        self.list_offset = 0;
        self.scroll.detach(self.sentinel);
        self.feed.reset(query);
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Background completions
    // ------------------------------------------------------------------------

    pub fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Page(loaded) => {
                if self.feed.apply(loaded) {
                    self.clamp_selection();
                    self.needs_redraw = true;
                }
            }
            FeedEvent::Trending(result) => {
                self.trending.apply(result);
                self.needs_redraw = true;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Result list navigation
    // ------------------------------------------------------------------------

    pub fn select_next(&mut self, n: usize) {
        let len = self.feed.state().items.len();
        if len > 0 {
            self.selected = self.selected.saturating_add(n).min(len - 1);
        }
    }

    pub fn select_prev(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.feed.state().items.len().saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let len = self.feed.state().items.len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Adjust `list_offset` so the selection and `SCROLL_OFF` rows below it
    /// fit in a viewport of `height` rows.
    ///
    /// The list has one extra row after the last result for the sentinel or
    /// the end-of-feed notice.
    pub fn scroll_into_view(&mut self, height: usize) {
        self.list_height = height;
        if height == 0 {
            return;
        }

        let total_rows = self.feed.state().items.len() + 1;
        let want_end = (self.selected + 1 + SCROLL_OFF).min(total_rows);

        if want_end > self.list_offset + height {
            self.list_offset = want_end - height;
        }
        if self.selected < self.list_offset {
            self.list_offset = self.selected;
        }
    }

    /// Whether the sentinel row is part of the current layout.
    pub fn sentinel_rendered(&self) -> bool {
        let state = self.feed.state();
        state.has_more
            && !state.loading
            && !state.loading_more
            && state.error.is_none()
            && !state.items.is_empty()
    }

    /// Report the list viewport to the scroll trigger after a render.
    ///
    /// Returns the number of appends the trigger fired.
    pub fn observe_viewport(&mut self) -> usize {
        if self.sentinel_rendered() {
            let row = to_row(self.feed.state().items.len());
            self.scroll.attach(self.sentinel, Span::new(row, 1));
        } else {
            self.scroll.detach(self.sentinel);
        }

        let viewport = Span::new(to_row(self.list_offset), to_row(self.list_height));
        let fired = self.scroll.observe(viewport, &mut self.feed);
        if fired > 0 {
            self.needs_redraw = true;
        }
        fired
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.scroll.stop_all();
        self.debounce.cancel();
    }
}

fn to_row(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
