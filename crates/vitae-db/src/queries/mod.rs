//! Database query modules.
//!
//! - titulos: credential records and their image representation

pub mod titulos;
