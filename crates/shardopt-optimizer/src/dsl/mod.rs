//! Static rule documents for fixtures and the CLI.

pub mod yaml;
