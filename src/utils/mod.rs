pub mod json_path;
pub mod location;
pub mod naming;

pub use location::extract_coordinates;
pub use naming::{camel_to_kebab, kebab_to_camel};
