// src/assets/mod.rs

//! Stylesheet compilation.
//!
//! - [`discover`] finds `scss`/`sass` directories, filters out partials and
//!   maps each source to its `.css` output.
//! - [`compiler`] runs the external compiler for every source.

pub mod compiler;
pub mod discover;

pub use compiler::{AssetCompiler, CompileReport};
pub use discover::{css_output_path, SourceMatcher, SourceOutputPair};
