//! Incremental page loading for observable item sequences.
//!
//! An [`IncrementalLoader`] owns an append-only, ordered sequence of items
//! and fills it one page at a time from a pluggable [`PageSource`]. Each
//! [`IncrementalLoader::request_load`] call performs exactly one fetch;
//! fetched items surface to the observing context as batched insertions via
//! [`ObserverDispatch`], and the loading/has-more flags are observable
//! through [`CollectionObserver`].
//!
//! The loading protocol guarantees:
//! - single-flight: overlapping `request_load` calls are rejected while one
//!   is in flight,
//! - cooperative cancellation via per-call child tokens derived from the
//!   loader-scoped [`CancellationToken`](tokio_util::sync::CancellationToken),
//! - error isolation: source failures are reported through [`LoadHooks`] and
//!   otherwise absorbed; `request_load` itself never fails,
//! - ordered observation: insertions from one page apply as a single
//!   dispatched unit, before the loading-ended edge.

mod dispatch;
mod error;
mod hooks;
mod loader;
mod observer;
mod source;

pub use dispatch::{DispatchJob, DispatchQueue, InlineDispatch, ObserverDispatch, QueueDispatch};
pub use error::LoaderConfigError;
pub use hooks::LoadHooks;
pub use loader::{DEFAULT_PAGE_SIZE, IncrementalLoader, LoadResult, LoaderSpec};
pub use observer::CollectionObserver;
pub use source::{FnPageSource, PageRequest, PageSource, VecPageSource, source_fn};
