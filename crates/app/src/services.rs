//! Application services built on top of the ports.

pub mod directory;

pub use directory::DirectoryService;
