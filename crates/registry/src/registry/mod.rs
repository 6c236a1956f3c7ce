//! Screen-keyed registry of meta boxes.
//!
//! One registry instance serves one request: extension code registers boxes
//! into it, the rendering phase iterates it, and it is dropped afterwards.
//! All mutation is synchronous on the owning thread.

use indexmap::IndexMap;

use crate::priority::{Priority, RegisterPriority};
use crate::record::{BoxCallback, CallbackArgs, MetaBox, Slot};
use crate::screen::{ScreenId, ScreenResolver, ScreenTarget};


/// One priority bucket: slots in registration order.
type Bucket = IndexMap<Box<str>, Slot>;

/// Contexts of one screen, in insertion order.
type ScreenBoxes = IndexMap<Box<str>, PriorityBuckets>;

/// The four priority buckets of one screen context.
#[derive(Debug, Clone, Default)]
pub struct PriorityBuckets {
	buckets: [Bucket; 4],
}

impl PriorityBuckets {
	fn bucket(&self, priority: Priority) -> &Bucket {
		&self.buckets[priority as usize]
	}

	fn bucket_mut(&mut self, priority: Priority) -> &mut Bucket {
		&mut self.buckets[priority as usize]
	}

	/// Live boxes in render order: `high, core, default, low`, registration
	/// order within each bucket.
	pub fn iter_live(&self) -> impl Iterator<Item = (Priority, &MetaBox)> {
		Priority::ALL.into_iter().flat_map(move |priority| {
			self.bucket(priority)
				.values()
				.filter_map(Slot::as_box)
				.map(move |record| (priority, record))
		})
	}

	/// Slot for an id within one bucket, tombstones included.
	pub fn slot(&self, priority: Priority, id: &str) -> Option<&Slot> {
		self.bucket(priority).get(id)
	}

	fn live_len(&self) -> usize {
		self.buckets
			.iter()
			.map(|bucket| bucket.values().filter(|slot| !slot.is_tombstone()).count())
			.sum()
	}
}

/// Screen-keyed mapping from `(context, priority)` buckets to meta boxes.
///
/// Owned, request-scoped state. A box id occupies at most one
/// `(context, priority)` slot per screen; [`register`](Self::register)
/// reconciles conflicts against prior registrations of the same id.
#[derive(Debug, Default)]
pub struct MetaBoxRegistry {
	resolver: ScreenResolver,
	screens: IndexMap<ScreenId, ScreenBoxes>,
}

impl MetaBoxRegistry {
	/// Registry wired to the host's screen directory.
	pub fn new(resolver: ScreenResolver) -> Self {
		Self {
			resolver,
			screens: IndexMap::new(),
		}
	}

	/// Registry with no screen directory attached.
	///
	/// Only pre-resolved [`ScreenTarget::Screen`] references register;
	/// lookups by name degrade to no-ops with a diagnostic.
	pub fn detached() -> Self {
		Self::default()
	}

	pub fn resolver(&self) -> &ScreenResolver {
		&self.resolver
	}

	/// Registers (or re-homes) a box on the given screens.
	///
	/// Applied independently once per flattened element of `screens`; an
	/// element whose screen cannot be resolved is skipped. `priority: None`
	/// means "match whatever is already registered", defaulting to
	/// [`Priority::Low`] for a first registration.
	///
	/// Conflict handling when `id` is already present somewhere on a screen:
	///
	/// - a tombstoned slot blocks `Core` and `Sorted` requests entirely;
	/// - a `Core` request never inserts its own payload: it only promotes an
	///   existing default-priority copy in the requested context into the
	///   core bucket; any other existing placement wins as-is;
	/// - a `Sorted` request adopts title, callback, args, and bucket from
	///   the existing record and moves it to the end of that bucket in the
	///   requested context;
	/// - in every case the id ends up in at most one `(context, priority)`
	///   slot for the screen.
	#[allow(
		clippy::too_many_arguments,
		reason = "registration surface mirrors the box record"
	)]
	pub fn register(
		&mut self,
		id: &str,
		title: impl Into<String>,
		callback: BoxCallback,
		screens: impl Into<ScreenTarget>,
		context: &str,
		priority: Option<RegisterPriority>,
		args: Option<CallbackArgs>,
	) {
		let title = title.into();
		let mut leaves = Vec::new();
		screens.into().into_leaves(&mut leaves);

		for target in leaves {
			let screen = match self
				.resolver
				.resolve_target(&target, "MetaBoxRegistry::register")
			{
				Ok(screen) => screen,
				Err(error) => {
					tracing::warn!(
						domain = "metabox",
						id,
						error = %error,
						"registration skipped: screen not resolved",
					);
					continue;
				}
			};
			self.register_on(
				screen,
				id,
				title.clone(),
				callback.clone(),
				context,
				priority,
				args.clone(),
			);
		}
	}

	#[allow(
		clippy::too_many_arguments,
		reason = "per-screen half of the registration surface"
	)]
	fn register_on(
		&mut self,
		screen: ScreenId,
		id: &str,
		mut title: String,
		mut callback: BoxCallback,
		context: &str,
		priority: Option<RegisterPriority>,
		mut args: Option<CallbackArgs>,
	) {
		let sorted = matches!(priority, Some(RegisterPriority::Sorted));
		let core_request = matches!(priority, Some(RegisterPriority::At(Priority::Core)));
		let mut effective = match priority {
			Some(RegisterPriority::At(p)) => Some(p),
			Some(RegisterPriority::Sorted) | None => None,
		};

		let boxes = self.screens.entry(screen.clone()).or_default();

		// Reconcile against every (context, priority) pair currently holding
		// this id: contexts in insertion order, buckets in Priority::ALL order.
		let context_names: Vec<Box<str>> = boxes.keys().cloned().collect();
		for a_context in &context_names {
			for a_priority in Priority::ALL {
				let Some(slot) = boxes
					.get(a_context.as_ref())
					.and_then(|buckets| buckets.bucket(a_priority).get(id))
					.cloned()
				else {
					continue;
				};

				// A deliberately removed core box must never come back.
				if slot.is_tombstone() && (core_request || sorted) {
					tracing::debug!(
						domain = "metabox",
						id,
						screen = %screen,
						context = %a_context,
						"registration blocked by tombstone",
					);
					return;
				}

				if core_request {
					// A core request never inserts its own payload over an
					// existing registration; it may only promote a
					// default-priority copy in the requested context to keep
					// sort order. Any other placement wins as-is.
					if a_priority == Priority::Default
						&& a_context.as_ref() == context
						&& let Some(buckets) = boxes.get_mut(a_context.as_ref())
						&& let Some(existing) =
							buckets.bucket_mut(Priority::Default).shift_remove(id)
					{
						buckets
							.bucket_mut(Priority::Core)
							.insert(Box::from(id), existing);
						tracing::debug!(
							domain = "metabox",
							id,
							screen = %screen,
							context = %a_context,
							"promoted default box to core",
						);
					}
					return;
				}

				if sorted {
					// Re-sort: the caller does not know the payload; adopt
					// it (and the bucket) from the existing record.
					if let Slot::Present(existing) = &slot {
						title = existing.title.clone();
						callback = existing.callback.clone();
						args = existing.args.clone();
						if effective.is_none() {
							effective = Some(a_priority);
						}
					}
				} else if effective.is_none() {
					// Unspecified priority matches whatever is already there.
					effective = Some(a_priority);
				}

				// One (context, priority) home per id. A sorted registration
				// always re-homes so the box takes a fresh position at the
				// end of its bucket.
				if sorted || effective != Some(a_priority) || context != a_context.as_ref() {
					if let Some(buckets) = boxes.get_mut(a_context.as_ref()) {
						buckets.bucket_mut(a_priority).shift_remove(id);
					}
				}
			}
		}

		if sorted && effective.is_none() {
			tracing::debug!(
				domain = "metabox",
				id,
				screen = %screen,
				"sorted registration without an existing box; skipped",
			);
			return;
		}

		let priority = effective.unwrap_or(Priority::Low);
		let record = MetaBox {
			id: Box::from(id),
			title,
			callback,
			args,
		};
		boxes
			.entry(Box::from(context))
			.or_default()
			.bucket_mut(priority)
			.insert(Box::from(id), Slot::Present(record));
		tracing::debug!(
			domain = "metabox",
			id,
			screen = %screen,
			context,
			priority = %priority,
			"meta box registered",
		);
	}

	/// Marks a box as removed on the given screens.
	///
	/// Writes a tombstone for the id into every priority bucket of
	/// `context`, fanning out over `screens` like
	/// [`register`](Self::register). A tombstoned id stays suppressed
	/// against `Core`/`Sorted` re-registration for the life of the registry.
	pub fn remove(&mut self, id: &str, screens: impl Into<ScreenTarget>, context: &str) {
		let mut leaves = Vec::new();
		screens.into().into_leaves(&mut leaves);

		for target in leaves {
			let screen = match self
				.resolver
				.resolve_target(&target, "MetaBoxRegistry::remove")
			{
				Ok(screen) => screen,
				Err(error) => {
					tracing::warn!(
						domain = "metabox",
						id,
						error = %error,
						"removal skipped: screen not resolved",
					);
					continue;
				}
			};

			let buckets = self
				.screens
				.entry(screen)
				.or_default()
				.entry(Box::from(context))
				.or_default();
			for priority in Priority::ALL {
				buckets.bucket_mut(priority).insert(Box::from(id), Slot::Tombstone);
			}
		}
	}

	/// Buckets of one screen context, if present.
	pub fn context_buckets(&self, screen: &ScreenId, context: &str) -> Option<&PriorityBuckets> {
		self.screens.get(screen)?.get(context)
	}

	/// Live boxes for one screen context, in render order.
	pub fn boxes_for<'a>(
		&'a self,
		screen: &ScreenId,
		context: &str,
	) -> impl Iterator<Item = &'a MetaBox> + use<'a> {
		self.context_buckets(screen, context)
			.into_iter()
			.flat_map(|buckets| buckets.iter_live().map(|(_, record)| record))
	}

	/// Context names of one screen, in insertion order.
	pub fn contexts<'a>(&'a self, screen: &ScreenId) -> impl Iterator<Item = &'a str> + use<'a> {
		self.screens
			.get(screen)
			.into_iter()
			.flat_map(|boxes| boxes.keys().map(AsRef::as_ref))
	}

	/// Live record and placement of a box id on a screen.
	pub fn find(&self, screen: &ScreenId, id: &str) -> Option<(&str, Priority, &MetaBox)> {
		let boxes = self.screens.get(screen)?;
		for (context, buckets) in boxes {
			for priority in Priority::ALL {
				if let Some(record) = buckets.bucket(priority).get(id).and_then(Slot::as_box) {
					return Some((context.as_ref(), priority, record));
				}
			}
		}
		None
	}

	/// Raw slot lookup, tombstones included.
	pub fn slot(
		&self,
		screen: &ScreenId,
		context: &str,
		priority: Priority,
		id: &str,
	) -> Option<&Slot> {
		self.context_buckets(screen, context)?
			.bucket(priority)
			.get(id)
	}

	/// Number of live boxes across all screens.
	pub fn len(&self) -> usize {
		self.screens
			.values()
			.map(|boxes| boxes.values().map(PriorityBuckets::live_len).sum::<usize>())
			.sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
