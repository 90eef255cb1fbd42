//! Backend implementations of the collaborator contracts
//!
//! The engine library ships only the headless backend; GPU-backed
//! implementations live with the embedding application, which owns the
//! graphics API and window system.

pub mod headless;
