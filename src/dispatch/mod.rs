//! Runtime dispatch machinery
//!
//! A function table is the versioned interface contract between the
//! dispatch layer and one (domain, backend) implementation: a plain
//! struct of optional entry points, one slot per operation, memory
//! model, and scalar type. Tables are populated by the built-in backend
//! providers or loaded from an independently built shared object, exactly
//! once per process, and are read-only afterwards.
//!
//! Nothing here is part of the public API; callers reach tables only
//! through the selector strategies in [`crate::select`].

pub(crate) mod registry;
pub(crate) mod tables;
