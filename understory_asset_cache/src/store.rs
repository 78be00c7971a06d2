// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Display;

use futures::future::LocalBoxFuture;

/// Asynchronous source of assets for an [`AssetCache`](crate::AssetCache).
///
/// Implementations usually wrap an HTTP endpoint bound to one collection. A
/// non-2xx response or a transport error should be reported as `Err`; the
/// cache logs it and leaves the key out.
pub trait AssetStore<K> {
    /// The asset produced for a key (raw bytes, a decoded image, ...).
    type Asset;
    /// Error reported for a failed fetch.
    type Error: Display;

    /// Fetches the asset stored under `key`.
    fn fetch<'a>(&'a self, key: &'a K) -> LocalBoxFuture<'a, Result<Self::Asset, Self::Error>>;
}
