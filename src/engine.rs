//! The match-merge-resolve pipeline.
//!
//! Parsing one input is a fixed, synchronous pipeline over the preprocessed
//! text:
//!
//! ```text
//! cleaned text ── matcher::raw_matches ──┐   (grammar scan, ordered,
//!                 (matcher.rs)           │    non-overlapping hits)
//!                                        v
//!                              merger::merge (merger.rs)
//!                                - glue back-to-back hits
//!                                - detect 到/至 range connectors
//!                                        │
//!                                        v
//!                          resolver::resolve_all (resolver.rs)
//!                                - bind fields  (binder.rs)
//!                                - inherit from context, then base
//!                                - future/past disambiguation
//!                                - compose datetime, drop unresolved
//!                                        │
//!                                        v
//!                                  Vec<TimeUnit>
//! ```
//!
//! The resolver is a fold: the partially bound calendar context produced by
//! each expression is passed into the next, which is what makes elliptical
//! references (去年 ... 6月) work. No step retries, suspends, or touches
//! shared mutable state; the same (text, base, preference) always yields the
//! same output.

#[path = "engine/binder.rs"]
pub(crate) mod binder;
#[path = "engine/matcher.rs"]
pub(crate) mod matcher;
#[path = "engine/merger.rs"]
pub(crate) mod merger;
#[path = "engine/resolver.rs"]
pub(crate) mod resolver;
