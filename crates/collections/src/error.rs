/// Errors surfaced by the tracking collections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
	/// Input the container refuses to accept.
	#[error("invalid argument: {reason}")]
	InvalidArgument { reason: String },

	/// Operation deliberately not implemented for this container.
	#[error("{container} does not support {operation}")]
	Unsupported {
		operation: &'static str,
		container: &'static str,
	},
}

impl CollectionError {
	pub(crate) fn invalid(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	pub(crate) fn unsupported(container: &'static str, operation: &'static str) -> Self {
		Self::Unsupported { operation, container }
	}
}

pub type Result<T, E = CollectionError> = std::result::Result<T, E>;
