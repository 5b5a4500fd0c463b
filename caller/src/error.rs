//! Stack inspection errors

use thiserror::Error;
use tracing::error;

/// Conditions under which the stack cannot be inspected.
///
/// These point at a wrong skip distance inside this crate or at a
/// pathologically shallow stack. The frame source returns them as values;
/// the resolver treats them as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// Not a single return address could be captured
    #[error("no stack frames could be captured")]
    StackUnavailable,

    /// Fewer frames were captured than need to be skipped
    #[error("not enough frames: cannot skip {skip} of {captured} captured frames")]
    InsufficientFrames { skip: usize, captured: usize },

    /// Every remaining frame was unresolved, so the caller has no name
    #[error("unable to get the calling function name: ran out of frames")]
    UnresolvedCaller,

    /// No frame yielded a package name
    #[error("unable to get the calling package name")]
    UnresolvedPackage,
}

/// Abort the current operation on an unrecoverable stack inspection error.
pub(crate) fn fatal(err: StackError) -> ! {
    error!("Stack inspection failed: {}", err);
    panic!("{}", err)
}
