//! Library side of the `pagewire` command line tool, exposed for the
//! integration tests and the xtask crate.
pub mod cli;
pub mod config;
pub mod render;
pub mod submit;
