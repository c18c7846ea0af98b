pub mod accelerator;
pub mod key_names;

pub use accelerator::AcceleratorParser;
pub use key_names::KeyNameResolver;
