//! Caller resolution
//!
//! A [`Resolver`] holds the ignore lists and walks the stack to find the first
//! frame that is not ignored. Frames of this crate and of the runtime crates
//! are always ignored.

use crate::config::Config;
use crate::error::{fatal, StackError};
use crate::frame::Frame;
use crate::names::{is_own_package, is_runtime_package};
use crate::source::{self, FrameSequence};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Number of frames fetched per [`Resolver::caller`] walk unless configured
/// otherwise. Very deep helper chains may need more.
pub const DEFAULT_NUMBER_OF_FRAMES_TO_GET: usize = 15;

/// Frames fetched when registering an ignore entry.
const MARK_FRAMES: usize = 5;

/// Skips `capture`, `frames` and the walk; lands on the registering method.
const MARK_SKIP: usize = 3;

/// Skips `capture` and `frames`. The rest of this crate's frames are dropped
/// by package, whether or not the entry point was inlined.
const CALLER_SKIP: usize = 2;

/// Ignored packages and functions
#[derive(Debug, Default, Clone)]
struct Registry {
    packages: Vec<String>,
    functions: Vec<String>,
}

impl Registry {
    const fn new() -> Self {
        Self {
            packages: Vec::new(),
            functions: Vec::new(),
        }
    }

    fn is_package_ignored(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    fn is_function_ignored(&self, function: &str) -> bool {
        self.functions.iter().any(|f| f == function)
    }

    /// Packages are checked before functions, so a function whose package is
    /// already ignored is never recorded.
    fn skips(&self, frame: &Frame) -> bool {
        let package = frame.package();
        is_runtime_package(package)
            || is_own_package(package)
            || self.is_package_ignored(package)
            || self.is_function_ignored(&frame.function)
    }

    /// First frame past this crate and the function that asked for its
    /// caller that the walk does not skip, else the outermost one.
    fn first_unskipped(&self, frames: impl Iterator<Item = Frame>) -> Frame {
        let mut last = None;
        for frame in frames
            .skip_while(|frame| is_own_package(frame.package()))
            .skip(1)
        {
            if !self.skips(&frame) {
                return frame;
            }
            last = Some(frame);
        }
        debug!("All fetched frames are ignored, returning the outermost one");
        last.unwrap_or_default()
    }

    fn add_function(&mut self, package: &str, function: String) -> bool {
        if self.is_function_ignored(&function)
            || is_own_package(package)
            || is_runtime_package(package)
            || self.is_package_ignored(package)
        {
            return false;
        }
        debug!("Ignoring function {}", function);
        self.functions.push(function);
        true
    }

    /// Function entries of the package that were recorded earlier are kept.
    fn add_package(&mut self, package: String) -> bool {
        if is_own_package(&package)
            || is_runtime_package(&package)
            || self.is_package_ignored(&package)
        {
            return false;
        }
        debug!("Ignoring package {}", package);
        self.packages.push(package);
        true
    }
}

/// Finds the caller of a logging-like function, skipping ignored frames.
///
/// Usually embedded in a logging facade:
///
/// ```
/// use caller::{Frame, Resolver};
///
/// struct Log {
///     resolver: Resolver,
/// }
///
/// impl Log {
///     fn new() -> Self {
///         let log = Self { resolver: Resolver::new() };
///         log.resolver.ignore_function("Log.info");
///         log
///     }
///
///     fn info(&self, msg: &str) {
///         self.emit("INFO", msg);
///     }
///
///     fn emit(&self, level: &str, msg: &str) {
///         let frame: Frame = self.resolver.caller();
///         println!("[{}] {} {}", level, frame, msg);
///     }
/// }
///
/// Log::new().info("reported at the caller of info");
/// ```
///
/// Ignore lists are meant to be filled during initialization; [`caller`]
/// only takes a read lock and can run on many threads at once.
///
/// [`caller`]: Resolver::caller
#[derive(Debug)]
pub struct Resolver {
    /// Frames to fetch per walk; 0 means the default
    frame_depth: AtomicUsize,
    registry: RwLock<Registry>,
}

impl Resolver {
    /// Create a resolver with empty ignore lists
    pub const fn new() -> Self {
        Self {
            frame_depth: AtomicUsize::new(0),
            registry: RwLock::new(Registry::new()),
        }
    }

    /// Create a resolver from a validated configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let resolver = Self::new();
        resolver.set_number_of_frames_to_get(config.frame_depth);
        Ok(resolver)
    }

    fn registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the calling function as a function to skip.
    ///
    /// Cheap to reason about but walks the stack on every call; for functions
    /// called often prefer [`ignore_function`](Self::ignore_function) once
    /// during setup. Does nothing if the function's package is already
    /// ignored.
    ///
    /// # Panics
    ///
    /// If the stack is too shallow or the caller cannot be named.
    #[inline(always)]
    pub fn helper(&self) {
        black_box(self.mark_helper());
    }

    #[inline(never)]
    pub(crate) fn mark_helper(&self) -> bool {
        let Some(frame) = calling_frame(MARK_SKIP).unwrap_or_else(|err| fatal(err)) else {
            return false;
        };
        let package = frame.package().to_string();
        self.registry_mut().add_function(&package, frame.function)
    }

    /// Mark `name`, a function in the calling package, as a function to skip.
    ///
    /// `name` is the item path as written inside its module, e.g. `"emit"` or
    /// `"Log.info"` for a method.
    ///
    /// # Panics
    ///
    /// If the stack is too shallow or the caller cannot be named.
    #[inline(always)]
    pub fn ignore_function(&self, name: &str) {
        black_box(self.mark_function(name));
    }

    #[inline(never)]
    pub(crate) fn mark_function(&self, name: &str) -> bool {
        let Some(frame) = calling_frame(MARK_SKIP).unwrap_or_else(|err| fatal(err)) else {
            return false;
        };
        let package = frame.package();
        let function = format!("{}.{}", package, name);
        self.registry_mut().add_function(package, function)
    }

    /// Mark the package of the calling function as a package to skip.
    ///
    /// Call it before any function of the package calls [`helper`](Self::helper):
    /// function entries recorded earlier for the same package are not removed.
    ///
    /// # Panics
    ///
    /// If the stack is too shallow or no package name can be found.
    #[inline(always)]
    pub fn ignore_package(&self) {
        black_box(self.mark_package());
    }

    #[inline(never)]
    pub(crate) fn mark_package(&self) -> bool {
        let package = calling_package(MARK_SKIP).unwrap_or_else(|err| fatal(err));
        self.registry_mut().add_package(package)
    }

    /// Change the number of frames fetched per walk. Values not above
    /// [`DEFAULT_NUMBER_OF_FRAMES_TO_GET`] are ignored.
    pub fn set_number_of_frames_to_get(&self, size: usize) {
        if size > DEFAULT_NUMBER_OF_FRAMES_TO_GET {
            self.frame_depth.store(size, Ordering::Relaxed);
        }
    }

    /// Number of frames fetched per walk
    pub fn number_of_frames_to_get(&self) -> usize {
        match self.frame_depth.load(Ordering::Relaxed) {
            0 => DEFAULT_NUMBER_OF_FRAMES_TO_GET,
            n => n,
        }
    }

    /// Find the caller of the function calling this method, skipping
    /// ignored frames.
    ///
    /// When every fetched frame is ignored the outermost one is returned.
    ///
    /// # Panics
    ///
    /// If the stack is too shallow to skip past this crate's own frames.
    #[inline(always)]
    pub fn caller(&self) -> Frame {
        black_box(self.resolve_caller())
    }

    #[inline(never)]
    pub(crate) fn resolve_caller(&self) -> Frame {
        let count = self.number_of_frames_to_get().saturating_add(CALLER_SKIP);
        let frames = source::frames(count, CALLER_SKIP).unwrap_or_else(|err| fatal(err));
        self.registry().first_unskipped(frames)
    }

    /// Whether a walk would skip this frame
    pub fn is_ignored(&self, frame: &Frame) -> bool {
        self.registry().skips(frame)
    }

    /// Snapshot of the ignored packages
    pub fn ignored_packages(&self) -> Vec<String> {
        self.registry().packages.clone()
    }

    /// Snapshot of the ignored functions
    pub fn ignored_functions(&self) -> Vec<String> {
        self.registry().functions.clone()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(never)]
fn calling_frame(skip: usize) -> Result<Option<Frame>, StackError> {
    first_foreign_frame(source::frames(MARK_FRAMES, skip)?)
}

#[inline(never)]
fn calling_package(skip: usize) -> Result<String, StackError> {
    first_foreign_package(source::frames(MARK_FRAMES, skip)?)
}

/// First frame outside this crate and the runtime, or `None` when the walk
/// runs out of frames.
fn first_foreign_frame<S: FrameSequence>(mut frames: S) -> Result<Option<Frame>, StackError> {
    while let Some(frame) = frames.next() {
        if !frame.is_symbolized() {
            if !frames.has_more() {
                return Err(StackError::UnresolvedCaller);
            }
            continue;
        }
        let package = frame.package();
        if !is_own_package(package) && !is_runtime_package(package) {
            return Ok(Some(frame));
        }
    }
    Ok(None)
}

/// Package of the first frame outside this crate. Falls back to the last
/// package seen when the walk runs out of frames.
fn first_foreign_package<S: FrameSequence>(mut frames: S) -> Result<String, StackError> {
    let mut package = String::new();
    while let Some(frame) = frames.next() {
        package = frame.package().to_string();
        let more = frames.has_more();
        if (package.is_empty() || is_own_package(&package)) && more {
            continue;
        }
        break;
    }
    if package.is_empty() {
        return Err(StackError::UnresolvedPackage);
    }
    Ok(package)
}
