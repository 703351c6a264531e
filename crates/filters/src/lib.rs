#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `filters` provides the name-matching primitives used by the `treewalk`
//! traversal engine: a single-rule matcher, a shell-glob compiler and an
//! include/exclude pair that decides whether a relative path is surfaced.
//!
//! # Design
//!
//! - [`Rule`] is a closed set of rule shapes: non-empty literal substring,
//!   compiled [`regex::Regex`], or caller predicate. The absent shape is
//!   `Option::<Rule>::None`; [`matches`] treats it as match-all. Rules are
//!   built only through validating constructors.
//! - [`glob::compile`] translates a shell glob into an anchored regex rule.
//!   [`GlobMatcher`] adds path semantics (separator normalisation, dot-file
//!   rejection, case folding, basename matching).
//! - [`PathFilter`] evaluates the exclude rule before the include rule and
//!   reports a [`FilterDecision`].
//!
//! # Invariants
//!
//! - A literal rule is never empty.
//! - An exclude hit always wins over an include hit.
//! - Malformed rules are reported as [`FilterError`] at construction time and
//!   never degrade into match-all.
//!
//! # Examples
//!
//! ```
//! use filters::{GlobOptions, build_filter, glob};
//!
//! let filter = build_filter(["**/*.{js,ts}"], ["node_modules/**"], GlobOptions::default())
//!     .expect("globs compile");
//! assert!(filter.allows("src/app/main.ts"));
//! assert!(!filter.allows("node_modules/pkg/index.js"));
//! assert!(!filter.allows("README.md"));
//!
//! assert!(glob::match_path("a/b/c.ts", "**/*.{js,ts}", GlobOptions::default()).unwrap());
//! ```

mod decision;
mod error;
pub mod glob;
mod rule;
mod set;

pub use decision::FilterDecision;
pub use error::FilterError;
pub use glob::{GlobMatcher, GlobOptions, compile, is_glob, match_path};
pub use rule::{Predicate, Rule, matches};
pub use set::{PathFilter, build_filter};
