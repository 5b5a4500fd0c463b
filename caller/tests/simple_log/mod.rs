//! A tiny logging package that uses the ignore lists in different orders.

use caller::{Frame, Resolver};
use std::hint::black_box;

#[derive(Default)]
pub struct MyCaller {
    pub resolver: Resolver,
}

impl MyCaller {
    #[inline(never)]
    fn not_in_ignore(&self) -> Frame {
        self.resolver.caller()
    }

    #[inline(never)]
    pub fn double(&self) -> Frame {
        black_box(self.not_in_ignore())
    }
}

#[inline(never)]
pub fn caller() -> Frame {
    let c = MyCaller::default();
    c.resolver.helper();
    c.not_in_ignore()
}

#[inline(never)]
pub fn not_in_ignore() -> Frame {
    let c = MyCaller::default();
    c.not_in_ignore()
}

#[inline(never)]
pub fn package() -> Frame {
    let c = MyCaller::default();
    c.resolver.ignore_package();
    c.double()
}

/// Ignores the package first; the helper call then records nothing.
#[inline(never)]
pub fn package_helper() -> (Frame, MyCaller) {
    let c = MyCaller::default();
    c.resolver.ignore_package();
    c.resolver.helper();
    (c.double(), c)
}

/// Records the helper first; ignoring the package keeps that entry.
#[inline(never)]
pub fn helper_package() -> (Frame, MyCaller) {
    let c = MyCaller::default();
    c.resolver.helper();
    c.resolver.ignore_package();
    (c.double(), c)
}
