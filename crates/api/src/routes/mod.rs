//! Route Handlers

pub mod marks;
pub mod students;
