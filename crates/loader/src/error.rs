use thiserror::Error;

/// Construction-time configuration errors.
///
/// Load-cycle failures (cancellation, source errors) never surface here;
/// they are absorbed by the loader and reported through
/// [`LoadHooks`](crate::LoadHooks) only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoaderConfigError {
	/// Page size must be a positive integer.
	#[error("page size must be > 0")]
	ZeroPageSize,
}
