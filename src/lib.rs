//! hckr: a terminal viewer for the hckrnews.com daily archive.
//!
//! The core is synchronous and UI-free:
//!
//! - [`model`] - story items and de-duplication
//! - [`cache`] - per-day cache with fetch lifecycle and LRU eviction
//! - [`view`] - filter, sort and color-band derivation
//! - [`nav`] - the [`Navigator`](nav::Navigator) that owns view state and cache
//! - [`keybindings`] / [`dispatch`] - key table and action dispatch
//!
//! Around it sit the fetcher ([`feed`]), configuration ([`config`]), themes
//! ([`theme`]) and the terminal shell ([`app`], [`ui`]).

pub mod app;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod feed;
pub mod keybindings;
pub mod model;
pub mod nav;
pub mod theme;
pub mod ui;
pub mod util;
pub mod view;
