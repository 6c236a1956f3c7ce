use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Canonical identifier for an admin screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(Box<str>);

impl ScreenId {
	pub fn new(id: impl Into<Box<str>>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ScreenId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ScreenId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for ScreenId {
	fn from(id: String) -> Self {
		Self::new(id)
	}
}

/// Screen reference accepted at the registration boundary.
///
/// `Many` fans out recursively: the operation is applied independently, once
/// per element, with all other parameters unchanged. A leaf that fails to
/// resolve skips only its own element.
#[derive(Debug, Clone)]
pub enum ScreenTarget {
	/// The directory's current screen.
	Current,
	/// A hook-name reference, resolved through the [`ScreenDirectory`].
	Name(String),
	/// An already-resolved screen.
	Screen(ScreenId),
	/// Apply the operation once per element.
	Many(Vec<ScreenTarget>),
}

impl ScreenTarget {
	/// Flattens nested `Many` targets into leaves, in order.
	pub(crate) fn into_leaves(self, out: &mut Vec<ScreenTarget>) {
		match self {
			Self::Many(targets) => {
				for target in targets {
					target.into_leaves(out);
				}
			}
			leaf => out.push(leaf),
		}
	}
}

impl From<&str> for ScreenTarget {
	fn from(name: &str) -> Self {
		Self::Name(name.to_string())
	}
}

impl From<String> for ScreenTarget {
	fn from(name: String) -> Self {
		Self::Name(name)
	}
}

impl From<ScreenId> for ScreenTarget {
	fn from(id: ScreenId) -> Self {
		Self::Screen(id)
	}
}

impl From<Vec<ScreenTarget>> for ScreenTarget {
	fn from(targets: Vec<ScreenTarget>) -> Self {
		Self::Many(targets)
	}
}

impl From<Vec<&str>> for ScreenTarget {
	fn from(names: Vec<&str>) -> Self {
		Self::Many(names.into_iter().map(ScreenTarget::from).collect())
	}
}

/// Host-owned screen directory.
///
/// The host application initializes this before any registration runs; the
/// registry only ever reads it.
pub trait ScreenDirectory: Send + Sync {
	/// Resolves a hook-name reference to a canonical screen.
	fn resolve(&self, hook_name: &str) -> Option<ScreenId>;

	/// The screen of the request being served, if any.
	fn current(&self) -> Option<ScreenId>;
}

/// Screen resolution failure.
///
/// None of these are fatal: the dependent registration degrades to a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
	/// The host has not attached a [`ScreenDirectory`] yet. Caller-usage
	/// error; a diagnostic is emitted when it is hit.
	#[error("screen directory not initialized")]
	DirectoryUninitialized,
	/// The directory has no screen for the given reference.
	#[error("unknown screen: {0:?}")]
	UnknownScreen(String),
	/// [`ScreenTarget::Current`] was used outside any screen.
	#[error("no current screen")]
	NoCurrentScreen,
}

/// Thin adapter over the host's [`ScreenDirectory`].
///
/// Carries no state of its own beyond the directory handle.
#[derive(Clone, Default)]
pub struct ScreenResolver {
	directory: Option<Arc<dyn ScreenDirectory>>,
}

impl ScreenResolver {
	pub fn new(directory: Arc<dyn ScreenDirectory>) -> Self {
		Self {
			directory: Some(directory),
		}
	}

	/// Resolver with no directory attached.
	///
	/// Only pre-resolved [`ScreenTarget::Screen`] references succeed; any
	/// lookup by name is a usage error.
	pub fn detached() -> Self {
		Self::default()
	}

	/// Resolves a hook-name reference to a canonical screen id.
	pub fn resolve(&self, hook_name: &str) -> Result<ScreenId, ResolveError> {
		let directory = self.directory("ScreenResolver::resolve")?;
		directory
			.resolve(hook_name)
			.ok_or_else(|| ResolveError::UnknownScreen(hook_name.to_string()))
	}

	/// Resolves a flattened (non-`Many`) target.
	pub(crate) fn resolve_target(
		&self,
		target: &ScreenTarget,
		caller: &'static str,
	) -> Result<ScreenId, ResolveError> {
		match target {
			ScreenTarget::Screen(id) => Ok(id.clone()),
			ScreenTarget::Name(name) => {
				let directory = self.directory(caller)?;
				directory
					.resolve(name)
					.ok_or_else(|| ResolveError::UnknownScreen(name.clone()))
			}
			ScreenTarget::Current => {
				let directory = self.directory(caller)?;
				directory.current().ok_or(ResolveError::NoCurrentScreen)
			}
			ScreenTarget::Many(_) => {
				unreachable!("flattened by ScreenTarget::into_leaves before resolution")
			}
		}
	}

	fn directory(&self, caller: &'static str) -> Result<&Arc<dyn ScreenDirectory>, ResolveError> {
		match &self.directory {
			Some(directory) => Ok(directory),
			None => {
				tracing::warn!(
					domain = "metabox",
					caller,
					"screen directory not initialized; screen resolution unavailable",
				);
				Err(ResolveError::DirectoryUninitialized)
			}
		}
	}
}

impl fmt::Debug for ScreenResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ScreenResolver")
			.field(
				"directory",
				if self.directory.is_some() {
					&"<attached>"
				} else {
					&"<detached>"
				},
			)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct TwoScreens;

	impl ScreenDirectory for TwoScreens {
		fn resolve(&self, hook_name: &str) -> Option<ScreenId> {
			matches!(hook_name, "post" | "page").then(|| ScreenId::new(hook_name))
		}

		fn current(&self) -> Option<ScreenId> {
			Some(ScreenId::new("dashboard"))
		}
	}

	#[test]
	fn test_resolve_known_screen() {
		let resolver = ScreenResolver::new(Arc::new(TwoScreens));
		assert_eq!(resolver.resolve("post"), Ok(ScreenId::new("post")));
	}

	#[test]
	fn test_resolve_unknown_screen() {
		let resolver = ScreenResolver::new(Arc::new(TwoScreens));
		assert_eq!(
			resolver.resolve("bogus"),
			Err(ResolveError::UnknownScreen("bogus".to_string()))
		);
	}

	#[test]
	fn test_detached_resolver_reports_usage_error() {
		let resolver = ScreenResolver::detached();
		assert_eq!(
			resolver.resolve("post"),
			Err(ResolveError::DirectoryUninitialized)
		);
	}

	#[test]
	fn test_detached_resolver_still_accepts_resolved_screens() {
		let resolver = ScreenResolver::detached();
		let target = ScreenTarget::Screen(ScreenId::new("post"));
		assert_eq!(
			resolver.resolve_target(&target, "test"),
			Ok(ScreenId::new("post"))
		);
	}

	#[test]
	fn test_into_leaves_flattens_nested_many() {
		let target = ScreenTarget::Many(vec![
			ScreenTarget::from("post"),
			ScreenTarget::Many(vec![ScreenTarget::from("page"), ScreenTarget::Current]),
		]);

		let mut leaves = Vec::new();
		target.into_leaves(&mut leaves);

		assert_eq!(leaves.len(), 3);
		assert!(matches!(&leaves[0], ScreenTarget::Name(n) if n == "post"));
		assert!(matches!(&leaves[1], ScreenTarget::Name(n) if n == "page"));
		assert!(matches!(&leaves[2], ScreenTarget::Current));
	}
}
