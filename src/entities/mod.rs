//! Record definition macros.

pub mod macros;
