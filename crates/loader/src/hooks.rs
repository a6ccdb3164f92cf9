/// Fire-and-forget lifecycle notifications for load cycles.
///
/// Hooks are not awaited and never affect a load's outcome. A panicking hook
/// is caught and logged; it cannot corrupt loader state.
pub trait LoadHooks: Send + Sync {
	/// A load cycle started.
	fn on_start(&self) {}

	/// A load cycle finished, regardless of outcome.
	fn on_end(&self) {}

	/// The source failed. Cancellation is never reported here.
	fn on_error(&self, _error: &anyhow::Error) {}
}
