//! Operations that span more than one store call.
pub mod catalog;
pub mod orders;
pub mod reports;
