//! Frame source
//!
//! Captures return addresses of the calling thread and symbolizes them lazily.
//! Captured frames start at `capture` itself: whatever the backtrace
//! machinery puts below it is dropped, so skip distances only count frames of
//! this crate and of its callers.

use crate::error::StackError;
use crate::frame::Frame;
use crate::names::{is_own_package, package_name, qualify};
use std::collections::VecDeque;
use tracing::debug;

/// Frames beyond this are not preallocated; deep captures grow as they go.
const PREALLOCATED_FRAMES: usize = 64;

/// A forward-only run of frames that can tell whether it is exhausted
/// without pulling.
pub trait FrameSequence: Iterator<Item = Frame> {
    fn has_more(&self) -> bool;
}

/// Lazy, forward-only sequence of frames.
///
/// One captured address may expand into several frames when calls were
/// inlined, so iterate rather than assume one frame per address.
pub struct Frames {
    raw: std::vec::IntoIter<backtrace::Frame>,
    pending: VecDeque<Frame>,
}

impl Frames {
    fn new(raw: Vec<backtrace::Frame>) -> Self {
        Self {
            raw: raw.into_iter(),
            pending: VecDeque::new(),
        }
    }

}

impl FrameSequence for Frames {
    /// Whether another pull can yield a frame
    fn has_more(&self) -> bool {
        !self.pending.is_empty() || !self.raw.as_slice().is_empty()
    }
}

impl FrameSequence for std::vec::IntoIter<Frame> {
    fn has_more(&self) -> bool {
        !self.as_slice().is_empty()
    }
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.pending.is_empty() {
            let raw = self.raw.next()?;
            self.pending = symbolize(&raw);
        }
        self.pending.pop_front()
    }
}

/// Capture up to `count + skip` frames (saturating) of the current thread and discard the
/// first `skip` of them.
///
/// Index 0 of the capture is the capturing function and index 1 is this one.
#[inline(never)]
pub fn frames(count: usize, skip: usize) -> Result<Frames, StackError> {
    let mut captured = capture(count.saturating_add(skip));
    let n = captured.len();
    if n == 0 {
        return Err(StackError::StackUnavailable);
    }
    if skip >= n - 1 {
        return Err(StackError::InsufficientFrames { skip, captured: n });
    }
    captured.drain(..skip);
    Ok(Frames::new(captured))
}

/// Walk the stack and keep at most `limit` frames, starting at this function.
#[inline(never)]
fn capture(limit: usize) -> Vec<backtrace::Frame> {
    let anchor = capture as fn(usize) -> Vec<backtrace::Frame> as usize;
    let mut captured = Vec::with_capacity(limit.min(PREALLOCATED_FRAMES));
    let mut preamble = Vec::new();

    backtrace::trace(|frame| {
        if captured.is_empty() && frame.symbol_address() as usize != anchor {
            preamble.push(frame.clone());
            return true;
        }
        captured.push(frame.clone());
        captured.len() < limit
    });

    if captured.is_empty() {
        // The unwinder could not tell where functions start; fall back to
        // looking for the first frame of this crate by name.
        let start = preamble.iter().position(is_own_frame).unwrap_or_else(|| {
            debug!("Capture frame not found, keeping all {} frames", preamble.len());
            0
        });
        captured = preamble.into_iter().skip(start).take(limit).collect();
    }
    captured
}

fn is_own_frame(raw: &backtrace::Frame) -> bool {
    let mut own = false;
    backtrace::resolve_frame(raw, |symbol| {
        if let Some(name) = symbol.name() {
            own |= is_own_package(package_name(&qualify(&format!("{:#}", name))));
        }
    });
    own
}

/// Expand one captured address into its (possibly inlined) frames,
/// innermost first.
fn symbolize(raw: &backtrace::Frame) -> VecDeque<Frame> {
    let ip = raw.ip() as usize as u64;
    let mut resolved = VecDeque::new();
    backtrace::resolve_frame(raw, |symbol| {
        let file = symbol.filename().map(|path| path.display().to_string());
        let line = symbol.lineno();
        let frame = match symbol.name() {
            Some(name) => Frame::from_symbol(ip, &format!("{:#}", name), file, line),
            None => Frame {
                file,
                line,
                ..Frame::new_unresolved(ip)
            },
        };
        resolved.push_back(frame);
    });
    if resolved.is_empty() {
        resolved.push_back(Frame::new_unresolved(ip));
    }
    resolved
}
