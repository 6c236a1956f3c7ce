//! Screen-keyed meta box registry.
//!
//! Admin UI panels ("meta boxes") are registered against named screens, into
//! named layout contexts, in one of four priority buckets. The registry is an
//! owned, request-scoped value: extension code builds it up during a request,
//! the rendering phase reads it back in bucket order, and it is dropped with
//! the request. No globals, no locks.
//!
//! Registration is conflict-resolving: a box id occupies at most one
//! `(context, priority)` slot per screen, a later registration re-homes an
//! earlier one, and an explicitly removed box leaves a [`Slot::Tombstone`]
//! that permanently blocks core-priority resurrection.
//!
//! Screen references are resolved through a host-provided
//! [`ScreenDirectory`]; a reference the directory cannot resolve degrades the
//! registration to a no-op rather than an error.

pub mod priority;
pub mod record;
pub mod registry;
pub mod screen;

pub use priority::{ParsePriorityError, Priority, RegisterPriority};
pub use record::{BoxCallback, CallbackArgs, MetaBox, Slot};
pub use registry::{MetaBoxRegistry, PriorityBuckets};
pub use screen::{ResolveError, ScreenDirectory, ScreenId, ScreenResolver, ScreenTarget};
