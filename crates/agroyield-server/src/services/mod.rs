//! Request-level services behind the HTTP handlers.

pub mod predict;
