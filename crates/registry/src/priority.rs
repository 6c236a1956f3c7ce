use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordering bucket within a screen context.
///
/// Buckets are scanned and rendered in the fixed order [`Priority::ALL`];
/// within a bucket, boxes keep registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
	/// Rendered first.
	High,
	/// Reserved for boxes the host application registers itself.
	Core,
	/// Standard placement.
	#[default]
	Default,
	/// Rendered last.
	Low,
}

impl Priority {
	/// All buckets in scan and render order.
	pub const ALL: [Priority; 4] = [
		Priority::High,
		Priority::Core,
		Priority::Default,
		Priority::Low,
	];

	/// Lowercase bucket name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::High => "high",
			Self::Core => "core",
			Self::Default => "default",
			Self::Low => "low",
		}
	}
}

impl fmt::Display for Priority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Failed to parse a priority bucket name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0:?}")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
	type Err = ParsePriorityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"high" => Ok(Self::High),
			"core" => Ok(Self::Core),
			"default" => Ok(Self::Default),
			"low" => Ok(Self::Low),
			other => Err(ParsePriorityError(other.to_string())),
		}
	}
}

/// Registration-time priority instruction.
///
/// A superset of [`Priority`]: the `Sorted` sentinel is accepted at the
/// registration boundary but never stored. It re-homes an already-registered
/// box, adopting its payload and bucket (see
/// [`MetaBoxRegistry::register`](crate::registry::MetaBoxRegistry::register)).
///
/// Callers that want "match whatever is already registered, else low" pass
/// `None` for the whole instruction instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterPriority {
	/// Place the box in the given bucket.
	At(Priority),
	/// Re-sort an existing box without knowing its payload.
	Sorted,
}

impl From<Priority> for RegisterPriority {
	fn from(priority: Priority) -> Self {
		Self::At(priority)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_priority_parse_round_trip() {
		for priority in Priority::ALL {
			assert_eq!(priority.as_str().parse::<Priority>(), Ok(priority));
		}
		assert!("sorted".parse::<Priority>().is_err());
		assert!("".parse::<Priority>().is_err());
	}

	#[test]
	fn test_scan_order_is_fixed() {
		assert_eq!(
			Priority::ALL,
			[
				Priority::High,
				Priority::Core,
				Priority::Default,
				Priority::Low
			]
		);
	}
}
