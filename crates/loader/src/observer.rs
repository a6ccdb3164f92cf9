/// Injected observer for the loader's collection surface.
///
/// Every method is invoked on the observer context configured through
/// [`ObserverDispatch`](crate::ObserverDispatch), with no loader lock held,
/// so implementations may read the loader's surface from any callback.
/// [`inserted`] fires once per item, in page order, just before the item
/// becomes visible in the sequence. A panicking callback is caught and
/// logged; it cannot corrupt loader state.
///
/// [`inserted`]: CollectionObserver::inserted
pub trait CollectionObserver<T>: Send + Sync {
	/// One item was appended at `index`.
	fn inserted(&self, index: usize, item: &T);

	/// The loading flag crossed an edge. Fires exactly once per edge.
	fn loading_changed(&self, _loading: bool) {}

	/// The has-more flag dropped to false. Fires at most once per loader.
	fn has_more_changed(&self, _has_more: bool) {}
}
