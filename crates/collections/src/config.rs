//! Sizing knobs for per-session tracking structures.

use serde::Deserialize;

use crate::error::{CollectionError, Result};

/// Default maximum size of an [`crate::ArrayIdentityMap`].
pub const DEFAULT_BOUNDED_MAP_CAPACITY: usize = 30;

/// Default initial capacity of an [`crate::IdentityRegistry`].
pub const DEFAULT_REGISTRY_CAPACITY: usize = 16;

/// Capacity settings read from the host's configuration file.
///
/// ```toml
/// registry_capacity = 64
/// bounded_map_capacity = 8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingConfig {
	/// Expected number of managed objects per session.
	pub registry_capacity: usize,
	/// Hard limit for the array-backed identity map.
	pub bounded_map_capacity: usize,
}

impl Default for TrackingConfig {
	fn default() -> Self {
		Self {
			registry_capacity: DEFAULT_REGISTRY_CAPACITY,
			bounded_map_capacity: DEFAULT_BOUNDED_MAP_CAPACITY,
		}
	}
}

impl TrackingConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input).map_err(|e| CollectionError::invalid(format!("tracking config: {e}")))?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects settings no container can be built from.
	pub fn validate(&self) -> Result<()> {
		if self.bounded_map_capacity == 0 {
			return Err(CollectionError::invalid("bounded_map_capacity must be > 0"));
		}
		Ok(())
	}
}
