//! Function and package names
//!
//! Frames carry qualified function names of the form `module/path.Item.method`:
//! the module path of the function joined with `/`, followed by the path of the
//! item inside that module joined with `.`. A closure inside
//! `my_app::log::Logger::info` is `my_app/log.Logger.info.{{closure}}`, and its
//! package is `my_app/log`.

/// Crates of the language runtime and of the stack capture machinery. Their
/// frames are never reported as a caller.
const RUNTIME_CRATES: &[&str] = &["std", "core", "alloc", "backtrace"];

/// Name of this crate as it appears in qualified function names.
pub(crate) const OWN_CRATE: &str = env!("CARGO_CRATE_NAME");

/// Parse the package name out of a qualified function name.
///
/// The package ends at the first `.` after the last `/`. Returns an empty
/// string when the name carries no package at all.
pub fn package_name(full_func_name: &str) -> &str {
    let slash = full_func_name.rfind('/').unwrap_or(0);
    match full_func_name[slash..].find('.') {
        Some(dot) => &full_func_name[..slash + dot],
        None => "",
    }
}

/// Top-level crate a package belongs to.
fn crate_of(package: &str) -> &str {
    package.split_once('/').map_or(package, |(root, _)| root)
}

/// Whether the package belongs to one of the runtime crates.
pub fn is_runtime_package(package: &str) -> bool {
    RUNTIME_CRATES.contains(&crate_of(package))
}

/// Whether the package belongs to this crate.
pub fn is_own_package(package: &str) -> bool {
    crate_of(package) == OWN_CRATE
}

/// Convert a demangled Rust symbol path into a qualified function name.
///
/// ```
/// use caller::names::qualify;
///
/// assert_eq!(qualify("my_app::log::Logger::info"), "my_app/log.Logger.info");
/// assert_eq!(qualify("<my_app::Log as core::fmt::Display>::fmt"), "my_app.Log.fmt");
/// assert_eq!(qualify("my_app::main::{{closure}}"), "my_app.main.{{closure}}");
/// ```
pub fn qualify(symbol: &str) -> String {
    let path = self_type_path(strip_hash(symbol.trim()));
    let segments: Vec<String> = split_path(&path)
        .into_iter()
        .map(strip_generics)
        .filter(|segment| !segment.is_empty())
        .collect();

    // Closures and other compiler-generated segments hang off the last real item.
    let Some(item) = segments.iter().rposition(|s| !s.starts_with('{')) else {
        return segments.join(".");
    };
    let modules = segments[..item]
        .iter()
        .take_while(|s| is_module_segment(s))
        .count();
    if modules == 0 {
        return segments.join(".");
    }
    format!(
        "{}.{}",
        segments[..modules].join("/"),
        segments[modules..].join(".")
    )
}

/// Remove the `::h0123456789abcdef` hash of legacy mangled symbols.
fn strip_hash(path: &str) -> &str {
    match path.rsplit_once("::") {
        Some((head, hash))
            if hash.len() == 17
                && hash.starts_with('h')
                && hash[1..].chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            head
        }
        _ => path,
    }
}

/// Rewrite `<Type as Trait>::method` and `<Type>::method` into `Type::method`.
///
/// Self types that are not paths (function pointers, tuples, slices) have no
/// package of their own, so the trait path names the item instead.
fn self_type_path(path: &str) -> String {
    let mut path = path.to_string();
    while path.starts_with('<') {
        let Some(close) = matching_angle(&path) else {
            break;
        };
        let (self_ty, trait_path) = split_at_as(&path[1..close]);
        let self_ty = ["&", "mut ", "dyn ", "*const ", "*mut "]
            .iter()
            .fold(self_ty.trim(), |ty, prefix| ty.strip_prefix(prefix).unwrap_or(ty))
            .trim_start();
        let named = match trait_path {
            Some(trait_path) if !is_path_type(self_ty) => trait_path.trim(),
            _ => self_ty,
        };
        path = format!("{}{}", named, &path[close + 1..]);
    }
    path
}

fn is_path_type(ty: &str) -> bool {
    ty.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && !["fn(", "fn ", "unsafe ", "extern "]
            .iter()
            .any(|prefix| ty.starts_with(prefix))
}

/// Depth change for the character at `i`. The `>` of `->` closes nothing.
fn angle_step(s: &str, i: usize, c: char) -> isize {
    match c {
        '<' => 1,
        '>' if i > 0 && s.as_bytes()[i - 1] == b'-' => 0,
        '>' => -1,
        _ => 0,
    }
}

/// Index of the `>` closing the `<` at the start of `path`.
fn matching_angle(path: &str) -> Option<usize> {
    let mut depth = 0isize;
    for (i, c) in path.char_indices() {
        let step = angle_step(path, i, c);
        depth += step;
        if depth < 0 {
            return None;
        }
        if step < 0 && depth == 0 {
            return Some(i);
        }
    }
    None
}

/// The self type and trait of a `Type as Trait` qualifier.
fn split_at_as(inner: &str) -> (&str, Option<&str>) {
    let mut depth = 0isize;
    for (i, c) in inner.char_indices() {
        depth = (depth + angle_step(inner, i, c)).max(0);
        if c == ' ' && depth == 0 && inner[i..].starts_with(" as ") {
            return (&inner[..i], Some(&inner[i + 4..]));
        }
    }
    (inner, None)
}

/// Split a path on `::` outside of generic arguments.
fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let (mut depth, mut start, mut i) = (0isize, 0, 0);
    while i < bytes.len() {
        match bytes[i] {
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            b => depth = (depth + angle_step(path, i, b as char)).max(0),
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}

fn strip_generics(segment: &str) -> String {
    let mut depth = 0isize;
    segment
        .char_indices()
        .filter(|&(i, c)| {
            let step = angle_step(segment, i, c);
            let keep = step == 0 && depth == 0;
            depth = (depth + step).max(0);
            keep
        })
        .map(|(_, c)| c)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Modules are snake_case by convention; types and traits are not.
fn is_module_segment(segment: &str) -> bool {
    segment
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
