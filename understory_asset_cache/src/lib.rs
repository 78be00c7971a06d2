// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_asset_cache --heading-base-level=0

//! Understory Asset Cache: a bounded key → asset store with LRU eviction.
//!
//! This crate provides [`AssetCache`], a small cache for per-path image bytes
//! (or decoded objects) used by tiled image viewers. It is filled in batches
//! from an [`AssetStore`], an asynchronous collaborator that knows how to
//! fetch one asset for one key.
//!
//! The cache follows a few simple rules:
//!
//! - It never holds more than `capacity` entries.
//! - [`AssetCache::add_batch`] only fetches keys that are not already present.
//!   Before inserting, it evicts the least recently used entries, skipping any
//!   key that is part of the incoming batch.
//! - A failed fetch is logged and the key is simply left out; callers must
//!   tolerate absent keys.
//! - [`AssetCache::get`] promotes a hit to most recently used and returns
//!   `None` on a miss without touching the cache. A miss is not an error; it
//!   is the cue to schedule another [`AssetCache::add_batch`].
//!
//! ## Minimal example
//!
//! ```rust
//! use futures::future::{LocalBoxFuture, FutureExt, ready};
//! use understory_asset_cache::{AssetCache, AssetStore};
//!
//! struct Echo;
//!
//! impl AssetStore<String> for Echo {
//!     type Asset = Vec<u8>;
//!     type Error = &'static str;
//!
//!     fn fetch<'a>(&'a self, key: &'a String) -> LocalBoxFuture<'a, Result<Vec<u8>, &'static str>> {
//!         ready(Ok(key.as_bytes().to_vec())).boxed_local()
//!     }
//! }
//!
//! let mut cache = AssetCache::new(2);
//! let keys = ["a.jpg".to_string(), "b.jpg".to_string()];
//! futures::executor::block_on(cache.add_batch(&keys, &Echo));
//!
//! assert_eq!(cache.get(&keys[0]).map(Vec::as_slice), Some(&b"a.jpg"[..]));
//! assert!(cache.get(&"c.jpg".to_string()).is_none());
//! ```
//!
//! The cache is single-threaded: it is meant to be owned by the UI thread's
//! event handlers, so no locking is involved.

mod cache;
mod store;

pub use cache::{AssetCache, BatchReport};
pub use store::AssetStore;
