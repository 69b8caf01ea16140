//! Macros Module
//!
//! Coroutine helpers for running resolutions on the `may` runtime.
//! `resolve_go!` is exported at the crate root.

mod go;
