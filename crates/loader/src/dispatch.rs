use tokio::sync::mpsc;

/// One unit of observer-context work.
pub type DispatchJob = Box<dyn FnOnce() + Send + 'static>;

/// Marshals loader-side mutations onto the context that owns the observer.
///
/// Jobs submitted by one loader must run in submission order; the loader
/// relies on that to keep insertions visible before the loading-ended edge.
pub trait ObserverDispatch: Send + Sync {
	/// Schedules one job on the observer context.
	fn dispatch(&self, job: DispatchJob);
}

/// Runs each job immediately on the calling task.
///
/// Suitable when the caller already is the observer context, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatch;

impl ObserverDispatch for InlineDispatch {
	fn dispatch(&self, job: DispatchJob) {
		job();
	}
}

/// Queue-backed dispatch handle paired with a [`DispatchQueue`].
///
/// The context that owns the observer drains the queue; everything submitted
/// through the handle runs there, in submission order.
#[derive(Clone)]
pub struct QueueDispatch {
	tx: mpsc::UnboundedSender<DispatchJob>,
}

/// Receiving half of [`QueueDispatch::channel`], drained by the observer
/// context.
pub struct DispatchQueue {
	rx: mpsc::UnboundedReceiver<DispatchJob>,
}

impl QueueDispatch {
	/// Creates a connected dispatch handle and queue.
	pub fn channel() -> (Self, DispatchQueue) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx }, DispatchQueue { rx })
	}
}

impl ObserverDispatch for QueueDispatch {
	fn dispatch(&self, job: DispatchJob) {
		if self.tx.send(job).is_err() {
			tracing::warn!("loader.dispatch.queue_closed");
		}
	}
}

impl DispatchQueue {
	/// Runs every job currently queued, returning how many ran.
	pub fn drain(&mut self) -> usize {
		let mut ran = 0usize;
		while let Ok(job) = self.rx.try_recv() {
			job();
			ran = ran.wrapping_add(1);
		}
		ran
	}

	/// Awaits and runs jobs until every dispatch handle is dropped.
	pub async fn run(mut self) {
		while let Some(job) = self.rx.recv().await {
			job();
		}
	}
}
