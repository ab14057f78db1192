//! Staff views.

pub mod list;
