//! Schema migrations live in the `migrations` workspace crate.

pub use migrations::Migrator;
