use caller::names::is_runtime_package;
use caller::{Frame, Resolver};
use std::hint::black_box;

mod simple_log;

#[inline(never)]
fn call_caller() -> Frame {
    let resolver = Resolver::new();
    resolver.caller()
}

#[inline(never)]
fn emit(resolver: &Resolver) -> Frame {
    resolver.caller()
}

#[inline(never)]
fn log_through_helper(resolver: &Resolver) -> Frame {
    resolver.helper();
    black_box(emit(resolver))
}

#[inline(never)]
fn mark(resolver: &Resolver) {
    resolver.helper();
}

#[inline(never)]
fn recurse(resolver: &Resolver, depth: usize) -> Frame {
    if depth == 0 {
        return black_box(emit(resolver));
    }
    black_box(recurse(resolver, black_box(depth - 1)))
}

/// A walk past every test frame ends in the test harness crate.
fn assert_harness_frame(resolver: &Resolver, frame: &Frame) {
    assert!(frame.is_symbolized());
    assert!(!resolver.is_ignored(frame), "{} is ignored", frame.function);
    assert!(!is_runtime_package(frame.package()));
    assert_eq!(frame.package().split('/').next(), Some("test"));
}

#[test]
fn from_this_file() {
    let frame = call_caller();
    assert_eq!(frame.function, "caller_test.from_this_file");
    assert_eq!(frame.package(), "caller_test");
    assert!(frame.file.unwrap().ends_with("caller_test.rs"));
}

#[test]
fn from_simple_log() {
    let frame = simple_log::caller();
    assert_eq!(frame.function, "caller_test.from_simple_log");
}

#[test]
fn not_in_ignore() {
    let frame = simple_log::not_in_ignore();
    assert_eq!(frame.function, "caller_test/simple_log.not_in_ignore");
}

#[test]
fn ignore_package() {
    let frame = simple_log::package();
    assert_eq!(frame.function, "caller_test.ignore_package");
}

#[test]
fn ignore_package_and_helper() {
    let (frame, c) = simple_log::package_helper();
    assert_eq!(frame.function, "caller_test.ignore_package_and_helper");
    assert_eq!(c.resolver.ignored_packages(), vec!["caller_test/simple_log"]);
    assert!(c.resolver.ignored_functions().is_empty());
}

#[test]
fn ignore_helper_and_package() {
    let (frame, c) = simple_log::helper_package();
    assert_eq!(frame.function, "caller_test.ignore_helper_and_package");
    assert_eq!(c.resolver.ignored_packages(), vec!["caller_test/simple_log"]);
    // Redundant with the package entry, but not pruned
    assert_eq!(
        c.resolver.ignored_functions(),
        vec!["caller_test/simple_log.helper_package"]
    );
}

#[test]
fn helper_skips_marked_function() {
    let resolver = Resolver::new();
    let frame = log_through_helper(&resolver);
    assert_eq!(frame.function, "caller_test.helper_skips_marked_function");
    assert_eq!(
        resolver.ignored_functions(),
        vec!["caller_test.log_through_helper"]
    );
}

#[test]
fn helper_is_idempotent() {
    let resolver = Resolver::new();
    mark(&resolver);
    mark(&resolver);
    assert_eq!(resolver.ignored_functions(), vec!["caller_test.mark"]);
}

#[test]
fn ignore_function_is_idempotent() {
    let resolver = Resolver::new();
    resolver.ignore_function("log_through_helper");
    resolver.ignore_function("log_through_helper");
    assert_eq!(
        resolver.ignored_functions(),
        vec!["caller_test.log_through_helper"]
    );

    let frame = log_through_helper(&resolver);
    assert_eq!(frame.function, "caller_test.ignore_function_is_idempotent");
    assert_eq!(resolver.ignored_functions().len(), 1);
}

#[test]
fn ignore_function_skips_named_function() {
    let resolver = Resolver::new();
    let frame = recurse(&resolver, 0);
    assert_eq!(frame.function, "caller_test.recurse");

    resolver.ignore_function("recurse");
    let frame = recurse(&resolver, 2);
    assert_eq!(
        frame.function,
        "caller_test.ignore_function_skips_named_function"
    );
}

#[test]
fn package_subsumes_functions() {
    let resolver = Resolver::new();
    resolver.ignore_package();
    resolver.ignore_function("emit");
    assert_eq!(resolver.ignored_packages(), vec!["caller_test"]);
    assert!(resolver.ignored_functions().is_empty());

    let frame = emit(&resolver);
    assert_harness_frame(&resolver, &frame);
}

#[test]
fn falls_back_to_last_frame_when_shallow() {
    let resolver = Resolver::new();
    resolver.ignore_package();

    // Every fetched frame belongs to the ignored package.
    let frame = recurse(&resolver, 2 * caller::DEFAULT_NUMBER_OF_FRAMES_TO_GET);
    assert_eq!(frame.function, "caller_test.recurse");
    assert!(resolver.is_ignored(&frame));
}

#[test]
fn deeper_walk_reaches_past_recursion() {
    let resolver = Resolver::new();
    resolver.ignore_package();
    resolver.set_number_of_frames_to_get(64);

    let frame = recurse(&resolver, 20);
    assert_harness_frame(&resolver, &frame);
}

#[test]
fn huge_frame_depth_walks_the_whole_stack() {
    let resolver = Resolver::new();
    resolver.set_number_of_frames_to_get(usize::MAX);
    assert_eq!(resolver.number_of_frames_to_get(), usize::MAX);

    let frame = emit(&resolver);
    assert_eq!(
        frame.function,
        "caller_test.huge_frame_depth_walks_the_whole_stack"
    );

    resolver.ignore_package();
    let frame = recurse(&resolver, 3);
    assert_harness_frame(&resolver, &frame);
}

#[test]
fn concurrent_callers_share_a_resolver() {
    let resolver = Resolver::new();
    resolver.ignore_function("emit");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let frame = emit(&resolver);
                assert!(frame
                    .function
                    .starts_with("caller_test.concurrent_callers_share_a_resolver"));
            });
        }
    });
}
