//! Durable resume storage and everything that happens after a draft is
//! confirmed: versioned persistence, the finalization pipeline, and the
//! CRUD surface over stored resumes.

pub mod finalize;
pub mod handlers;
pub mod repository;
pub mod versioning;
