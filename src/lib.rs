//! Terminal movie browser over the TMDB catalog.
//!
//! The interesting parts live in [`feed`]: a debounced search box drives
//! [`feed::FeedController::reset`], and a sentinel row observed by
//! [`feed::ScrollTrigger`] drives [`feed::FeedController::append`].

pub mod app;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod region;
pub mod ui;
pub mod util;
