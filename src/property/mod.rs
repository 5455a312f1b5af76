//! Properties: the runtime's get/set surface.
//!
//! - [`id`] - Property identifiers
//! - [`value`] - Typed property values
//! - [`table`] - Typed accessors and the generic routine that drives them

pub mod id;
pub mod table;
pub mod value;

pub use id::PropertyId;
pub use table::Property;
pub use value::{ObjectMap, PropertyType, PropertyValue};
