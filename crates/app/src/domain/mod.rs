//! Eshop Domain Concerns

pub mod catalog;
