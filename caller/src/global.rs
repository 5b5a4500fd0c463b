//! Process-wide default resolver
//!
//! The free functions share one [`Resolver`] that lives for the whole
//! process. Fill its ignore lists during initialization, then call
//! [`caller`] from anywhere.
//!
//! Functions that walk the stack are inlined into the function calling them
//! and consume the walk's result there, so that function is never turned
//! into a tail call and keeps its frame. The depth accessors do not walk.

use crate::frame::Frame;
use crate::resolver::Resolver;
use std::hint::black_box;

static DEFAULT_RESOLVER: Resolver = Resolver::new();

/// The resolver behind the free functions
pub fn default_resolver() -> &'static Resolver {
    &DEFAULT_RESOLVER
}

/// Find the caller of the function calling this one, skipping ignored frames.
#[inline(always)]
pub fn caller() -> Frame {
    black_box(DEFAULT_RESOLVER.resolve_caller())
}

/// Add the calling function to the function ignore list.
#[inline(always)]
pub fn helper() {
    black_box(DEFAULT_RESOLVER.mark_helper());
}

/// Add `name` in the calling package to the function ignore list. Cheaper
/// than [`helper`] for functions called often.
#[inline(always)]
pub fn ignore_function(name: &str) {
    black_box(DEFAULT_RESOLVER.mark_function(name));
}

/// Add the package of the calling function to the package ignore list.
#[inline(always)]
pub fn ignore_package() {
    black_box(DEFAULT_RESOLVER.mark_package());
}

/// Change the number of frames fetched per walk. Leave it alone unless
/// helper chains are deeper than the default.
pub fn set_number_of_frames_to_get(size: usize) {
    DEFAULT_RESOLVER.set_number_of_frames_to_get(size)
}

/// Number of frames fetched per walk
pub fn number_of_frames_to_get() -> usize {
    DEFAULT_RESOLVER.number_of_frames_to_get()
}
