//! Command line definitions shared by the binaries.

pub mod join;
