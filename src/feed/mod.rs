//! Fetch orchestration for the paginated movie feed.
//!
//! - [`debounce`] - quiet-period gate between the search box and the feed
//! - [`controller`] - reset/append lifecycle over [`FeedState`]
//! - [`scroll`] - sentinel visibility trigger driving appends
//! - [`pagination`] - page-window tokens for the footer
//! - [`trending`] - one-shot highlight list
//!
//! Fetches run as spawned tasks and report back as [`FeedEvent`]s on a single
//! channel; the owner of the controller drains it and calls
//! [`FeedController::apply`] / [`TrendingList::apply`].

mod controller;
mod debounce;
mod pagination;
mod scroll;
mod trending;

pub use controller::{FeedController, FeedError, FeedState, FetchKind, PageLoaded};
pub use debounce::{DebounceGate, DEFAULT_DEBOUNCE};
pub use pagination::{page_window, PageNav, PageToken, MAX_VISIBLE_PAGES};
pub use scroll::{ScrollTrigger, Span, SubscriptionHandle, DEFAULT_THRESHOLD};
pub use trending::{TrendingList, DEFAULT_TRENDING_COUNT};

use crate::catalog::{CatalogError, Movie};

/// Completion messages from background fetches.
#[derive(Debug)]
pub enum FeedEvent {
    Page(PageLoaded),
    Trending(Result<Vec<Movie>, CatalogError>),
}
