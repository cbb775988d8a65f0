//! Stack growth guard for recursive evaluation.
//!
//! Expression evaluation and assignment both recurse once per nesting level of
//! the script, and a rebind chain (`a.b[0].c = v` growing a container three
//! levels down) recurses again on the way back up. Tenant scripts choose that
//! depth, so every recursive entry point runs through [`ensure_sufficient_stack`].
//!
//! Native targets grow the stack through `stacker`; WASM calls straight through.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (1MB).
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
