//! Patient management views: the searchable register and the registration form.

pub mod add;
pub mod list;
