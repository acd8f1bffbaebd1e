mod extension;
mod options;

pub use extension::Extension;
pub use options::Options;
