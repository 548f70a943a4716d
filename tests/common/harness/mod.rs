//! Test harness: isolated environments, command wrappers, fixtures.

mod command;
mod document;
mod env;

pub use command::WarrenCommand;
pub use document::TestDocument;
pub use env::TestEnv;
