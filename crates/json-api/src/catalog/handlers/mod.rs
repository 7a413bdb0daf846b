//! Catalog Handlers

pub(crate) mod get;
pub(crate) mod import;
pub(crate) mod index;
