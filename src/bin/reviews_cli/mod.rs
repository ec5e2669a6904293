//! CLI subcommand implementations for anchor-reviews

pub mod decode;
pub mod discriminator;
pub mod list;
