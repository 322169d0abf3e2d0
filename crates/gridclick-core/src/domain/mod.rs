//! Domain entities for GridClick.
//!
//! All business logic that is independent of OS APIs and UI frameworks lives here.

pub mod event;
pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod mode;
