/// Errors surfaced by resource bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
	/// A statement was registered twice without an intervening removal.
	#[error("statement already registered: {statement}")]
	AlreadyRegistered { statement: String },
}

pub type Result<T, E = ResourceError> = std::result::Result<T, E>;
