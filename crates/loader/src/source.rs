use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// One bounded fetch request: which page, and how many items it may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
	/// Zero-based page cursor. Advances once per attempted fetch.
	pub index: u64,
	/// Fixed page size configured on the loader.
	pub size: usize,
}

/// Pluggable fetch capability the loader pulls pages from.
///
/// An empty page is the terminal signal: the loader stops asking once a
/// source returns no items. Implementations should honor `cancel` promptly;
/// the loader additionally abandons a fetch on its own side when the token
/// fires mid-flight.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
	type Item: Send + 'static;

	/// Fetches the next page of items, or fails.
	async fn fetch_page(&self, request: PageRequest, cancel: &CancellationToken) -> anyhow::Result<Vec<Self::Item>>;
}

/// [`PageSource`] adapter over an async closure. Built by [`source_fn`].
pub struct FnPageSource<F> {
	fetch: F,
}

/// Wraps an async closure as a [`PageSource`].
///
/// Callers hand the loader a ready-made fetch function; there is no implicit
/// default construction of source types.
pub fn source_fn<F, Fut, T>(fetch: F) -> FnPageSource<F>
where
	F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = anyhow::Result<Vec<T>>> + Send,
	T: Send + 'static,
{
	FnPageSource { fetch }
}

#[async_trait]
impl<F, Fut, T> PageSource for FnPageSource<F>
where
	F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = anyhow::Result<Vec<T>>> + Send,
	T: Send + 'static,
{
	type Item = T;

	async fn fetch_page(&self, request: PageRequest, _cancel: &CancellationToken) -> anyhow::Result<Vec<T>> {
		(self.fetch)(request).await
	}
}

/// In-memory source serving pages off a fixed item vector.
///
/// Requests past the end yield an empty page, so a loader over this source
/// reports exhaustion exactly when the vector runs out.
#[derive(Debug, Clone)]
pub struct VecPageSource<T> {
	items: Arc<Vec<T>>,
}

impl<T> VecPageSource<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Creates a source over the given items.
	pub fn new(items: Vec<T>) -> Self {
		Self { items: Arc::new(items) }
	}

	/// Creates a source over shared items.
	pub fn from_arc(items: Arc<Vec<T>>) -> Self {
		Self { items }
	}
}

#[async_trait]
impl<T> PageSource for VecPageSource<T>
where
	T: Clone + Send + Sync + 'static,
{
	type Item = T;

	async fn fetch_page(&self, request: PageRequest, _cancel: &CancellationToken) -> anyhow::Result<Vec<T>> {
		let start = usize::try_from(request.index).unwrap_or(usize::MAX).saturating_mul(request.size);
		if start >= self.items.len() {
			return Ok(Vec::new());
		}
		let end = start.saturating_add(request.size).min(self.items.len());
		Ok(self.items[start..end].to_vec())
	}
}
