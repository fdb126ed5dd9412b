//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data-access contract front ends depend on.
//! - Isolate backing-file format details from callers.
//!
//! # Invariants
//! - Mutating APIs leave the backing file equal to the in-memory sequence
//!   whenever they return success.
//! - Repository APIs return semantic errors (`DuplicateTitle`) in addition
//!   to transport errors.

pub mod expense_repo;
