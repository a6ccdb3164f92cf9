use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::dispatch::{InlineDispatch, ObserverDispatch};
use crate::error::LoaderConfigError;
use crate::hooks::LoadHooks;
use crate::observer::CollectionObserver;
use crate::source::{PageRequest, PageSource};


/// Default items-per-page when the spec does not override it.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Outcome of one [`IncrementalLoader::request_load`] invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadResult {
	/// Items actually appended to the sequence by this invocation.
	pub appended: usize,
}

/// Builder-style configuration for one loader instance.
pub struct LoaderSpec<T> {
	page_size: usize,
	hooks: Option<Arc<dyn LoadHooks>>,
	observer: Option<Arc<dyn CollectionObserver<T>>>,
	dispatch: Arc<dyn ObserverDispatch>,
}

impl<T> Default for LoaderSpec<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> LoaderSpec<T> {
	/// Creates a spec with the default page size, no hooks, no observer and
	/// inline dispatch.
	pub fn new() -> Self {
		Self {
			page_size: DEFAULT_PAGE_SIZE,
			hooks: None,
			observer: None,
			dispatch: Arc::new(InlineDispatch),
		}
	}

	/// Sets the fixed items-per-page.
	#[must_use]
	pub fn page_size(mut self, size: usize) -> Self {
		self.page_size = size;
		self
	}

	/// Sets lifecycle hooks.
	#[must_use]
	pub fn hooks(mut self, hooks: Arc<dyn LoadHooks>) -> Self {
		self.hooks = Some(hooks);
		self
	}

	/// Sets the collection observer.
	#[must_use]
	pub fn observer(mut self, observer: Arc<dyn CollectionObserver<T>>) -> Self {
		self.observer = Some(observer);
		self
	}

	/// Sets the observer-context dispatch primitive.
	#[must_use]
	pub fn dispatch(mut self, dispatch: Arc<dyn ObserverDispatch>) -> Self {
		self.dispatch = dispatch;
		self
	}
}

struct LoaderState<T> {
	items: Mutex<Vec<T>>,
	loading: AtomicBool,
	has_more: AtomicBool,
	page_index: AtomicU64,
}

/// Incremental-loading, observable, ordered sequence of items.
///
/// The loader owns the sequence exclusively; callers read it through
/// [`len`](Self::len)/[`snapshot`](Self::snapshot) and mutate it only by
/// driving [`request_load`](Self::request_load).
pub struct IncrementalLoader<S>
where
	S: PageSource,
{
	source: S,
	state: Arc<LoaderState<S::Item>>,
	page_size: usize,
	hooks: Option<Arc<dyn LoadHooks>>,
	observer: Option<Arc<dyn CollectionObserver<S::Item>>>,
	dispatch: Arc<dyn ObserverDispatch>,
	cancel: CancellationToken,
}

impl<S> Drop for IncrementalLoader<S>
where
	S: PageSource,
{
	fn drop(&mut self) {
		// Teardown is just releasing the cancellation handle: child tokens
		// and token clones held elsewhere observe the cancel.
		self.cancel.cancel();
	}
}

impl<S> IncrementalLoader<S>
where
	S: PageSource,
{
	/// Creates a loader from a constructed source and spec.
	///
	/// Zero page size is the one fatal configuration error; everything that
	/// can go wrong during a load cycle is absorbed per cycle instead.
	pub fn new(source: S, spec: LoaderSpec<S::Item>) -> Result<Self, LoaderConfigError> {
		if spec.page_size == 0 {
			return Err(LoaderConfigError::ZeroPageSize);
		}
		Ok(Self {
			source,
			state: Arc::new(LoaderState {
				items: Mutex::new(Vec::new()),
				loading: AtomicBool::new(false),
				has_more: AtomicBool::new(true),
				page_index: AtomicU64::new(0),
			}),
			page_size: spec.page_size,
			hooks: spec.hooks,
			observer: spec.observer,
			dispatch: spec.dispatch,
			cancel: CancellationToken::new(),
		})
	}

	/// Fetches and appends at most one page.
	///
	/// `requested` is advisory; the configured page size governs the fetch
	/// volume. The returned future never fails: cancellation and source
	/// errors are absorbed into the observable flags (and the optional
	/// hooks), so a failed or cancelled fetch looks like an exhausted source.
	pub async fn request_load(&self, requested: usize) -> LoadResult {
		if self.cancel.is_cancelled() {
			tracing::debug!(requested, "loader.request.cancelled_before_start");
			return LoadResult::default();
		}

		// Single-flight guard: the loading flag doubles as the lock.
		if self.state.loading.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
			tracing::debug!(requested, "loader.request.rejected_overlap");
			return LoadResult::default();
		}
		self.notify_loading(true);

		let call_cancel = self.cancel.child_token();
		let request = PageRequest {
			// Cursor counts attempts, not successes.
			index: self.state.page_index.fetch_add(1, Ordering::AcqRel),
			size: self.page_size,
		};
		tracing::debug!(page = request.index, size = request.size, requested, "loader.request.fetch");

		// Cancel-aware fetch: preempt the source if the token fires mid-await.
		let fetched = tokio::select! {
			biased;
			_ = call_cancel.cancelled() => {
				tracing::debug!(page = request.index, "loader.request.cancelled_midflight");
				None
			}
			res = self.source.fetch_page(request, &call_cancel) => match res {
				Ok(page) => Some(page),
				Err(error) => {
					tracing::warn!(page = request.index, %error, "loader.request.fetch_failed");
					if let Some(hooks) = &self.hooks {
						let hooks = Arc::clone(hooks);
						guard_callback("on_error", move || hooks.on_error(&error));
					}
					None
				}
			}
		};

		let appended = match fetched {
			Some(page) if !page.is_empty() && !call_cancel.is_cancelled() => self.append_page(page),
			_ => {
				self.mark_exhausted();
				0
			}
		};

		self.state.loading.store(false, Ordering::Release);
		self.notify_loading(false);
		LoadResult { appended }
	}

	/// Returns true while a fetch is in flight.
	pub fn is_loading(&self) -> bool {
		self.state.loading.load(Ordering::Acquire)
	}

	/// Returns whether another [`request_load`](Self::request_load) can
	/// still append items.
	///
	/// Reads false once the source is exhausted, and whenever the loader is
	/// cancelled; cancellation does not mutate the stored flag.
	pub fn has_more_items(&self) -> bool {
		!self.cancel.is_cancelled() && self.state.has_more.load(Ordering::Acquire)
	}

	/// Current length of the sequence.
	pub fn len(&self) -> usize {
		self.state.items.lock().len()
	}

	/// Returns true when no items have been appended yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Clones the current sequence contents, in arrival order.
	pub fn snapshot(&self) -> Vec<S::Item>
	where
		S::Item: Clone,
	{
		self.state.items.lock().clone()
	}

	/// Number of pages attempted so far.
	pub fn page_index(&self) -> u64 {
		self.state.page_index.load(Ordering::Acquire)
	}

	/// Requests cancellation for this loader.
	///
	/// An in-flight fetch is abandoned and its result discarded; future
	/// calls short-circuit without touching the source.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Returns the loader-scoped cancellation token.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Appends one fetched page as a single dispatched unit, so the observer
	/// sees the whole batch applied atomically on its own context.
	///
	/// Each insertion notification fires with the item still locally owned
	/// and no loader lock held, so observers may read the loader's surface
	/// from the callback.
	fn append_page(&self, page: Vec<S::Item>) -> usize {
		let appended = page.len();
		let state = Arc::clone(&self.state);
		let observer = self.observer.clone();
		self.dispatch.dispatch(Box::new(move || {
			for item in page {
				let index = state.items.lock().len();
				if let Some(observer) = &observer {
					guard_callback("inserted", || observer.inserted(index, &item));
				}
				state.items.lock().push(item);
			}
		}));
		tracing::debug!(appended, "loader.request.appended");
		appended
	}

	/// Drops the has-more flag, notifying on the edge only.
	fn mark_exhausted(&self) {
		if self.state.has_more.swap(false, Ordering::AcqRel) {
			tracing::debug!("loader.exhausted");
			if let Some(observer) = &self.observer {
				let observer = Arc::clone(observer);
				self.dispatch.dispatch(Box::new(move || {
					guard_callback("has_more_changed", || observer.has_more_changed(false));
				}));
			}
		}
	}

	/// Emits one loading edge to the observer and fires the matching hook.
	fn notify_loading(&self, loading: bool) {
		if let Some(observer) = &self.observer {
			let observer = Arc::clone(observer);
			self.dispatch.dispatch(Box::new(move || {
				guard_callback("loading_changed", || observer.loading_changed(loading));
			}));
		}
		if let Some(hooks) = &self.hooks {
			let hooks = Arc::clone(hooks);
			if loading {
				guard_callback("on_start", move || hooks.on_start());
			} else {
				guard_callback("on_end", move || hooks.on_end());
			}
		}
	}
}

/// Runs one fire-and-forget hook or observer notification, containing
/// panics so a misbehaving callback cannot corrupt loader state or skip the
/// loading-ended cleanup.
fn guard_callback(name: &'static str, callback: impl FnOnce()) {
	if catch_unwind(AssertUnwindSafe(callback)).is_err() {
		tracing::warn!(callback = name, "loader.callback.panicked");
	}
}
