mod errors;
pub use errors::*;

mod event;
pub use event::*;

mod identity;
pub use identity::*;

mod registry;
pub use registry::*;

mod serializer;
pub use serializer::*;

mod version;
pub use version::*;

#[cfg(test)]
pub mod testing;
