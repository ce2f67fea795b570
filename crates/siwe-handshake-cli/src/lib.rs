/*
[INPUT]:  Binary modules
[OUTPUT]: Configuration types shared by the binary and its tests
[POS]:    Crate root - module wiring
[UPDATE]: When adding modules to the binary crate
*/

pub mod config;

pub use config::CliConfig;
