use std::fmt;
use std::sync::Arc;

/// Opaque render handle attached to a box.
///
/// The registry never invokes it; the rendering phase calls it with the
/// stored record. Compared by pointer identity (`Arc::ptr_eq`).
pub type BoxCallback = Arc<dyn Fn(&MetaBox) + Send + Sync>;

/// Optional key-value payload forwarded to the callback at render time.
pub type CallbackArgs = serde_json::Map<String, serde_json::Value>;

/// A registered admin panel.
#[derive(Clone)]
pub struct MetaBox {
	/// Identity key, unique per screen across all buckets.
	pub id: Box<str>,
	/// Heading shown on the rendered panel.
	pub title: String,
	/// Render handle.
	pub callback: BoxCallback,
	/// Extra arguments for the callback.
	pub args: Option<CallbackArgs>,
}

impl MetaBox {
	/// Creates a record with no callback arguments.
	pub fn new(id: impl Into<Box<str>>, title: impl Into<String>, callback: BoxCallback) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			callback,
			args: None,
		}
	}
}

impl fmt::Debug for MetaBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MetaBox")
			.field("id", &self.id)
			.field("title", &self.title)
			.field("callback", &"<callback>")
			.field("args", &self.args)
			.finish()
	}
}

/// A bucket slot: either a live box or an explicit removal marker.
///
/// A tombstone is not an absence. It records "deliberately removed" and
/// permanently blocks `Core`- and `Sorted`-priority re-registration of the
/// id; registrations at the other priorities may overwrite it.
#[derive(Debug, Clone)]
pub enum Slot {
	/// A live, renderable box.
	Present(MetaBox),
	/// Explicitly removed; never resurrected by a core registration.
	Tombstone,
}

impl Slot {
	/// The live record, if this slot holds one.
	pub fn as_box(&self) -> Option<&MetaBox> {
		match self {
			Self::Present(record) => Some(record),
			Self::Tombstone => None,
		}
	}

	pub fn is_tombstone(&self) -> bool {
		matches!(self, Self::Tombstone)
	}
}
