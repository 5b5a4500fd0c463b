//! Caller resolution with ignore lists
//!
//! This crate walks the calling thread's stack to find "the real caller" of a
//! logging-like function. Functions and whole modules can be marked as
//! uninteresting, a la test helpers, and are skipped during the walk. Frames
//! of this crate and of the runtime crates (`std`, `core`, `alloc`,
//! `backtrace`) are always skipped.
//!
//! Either embed a [`Resolver`] in your own type or use the free functions,
//! which share a process-wide default resolver.
//!
//! ```
//! fn log(msg: &str) {
//!     let frame = caller::caller();
//!     println!("{}:{} {}", frame.file.unwrap_or_default(), frame.line.unwrap_or(0), msg);
//! }
//!
//! fn fatal(msg: &str) {
//!     // Report the caller of `fatal`, not `fatal` itself.
//!     caller::helper();
//!     log(msg);
//! }
//!
//! fatal("boom");
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod global;
pub mod names;
pub mod resolver;
pub mod source;

pub use config::Config;
pub use error::StackError;
pub use frame::Frame;
pub use global::{
    caller, default_resolver, helper, ignore_function, ignore_package, number_of_frames_to_get,
    set_number_of_frames_to_get,
};
pub use names::package_name;
pub use resolver::{Resolver, DEFAULT_NUMBER_OF_FRAMES_TO_GET};
pub use source::FrameSequence;
