//! Concrete recipes.

pub mod change_method_name;
pub mod coalesce_properties;
pub mod delete_property;
pub mod remove_extra_semicolons;

pub use change_method_name::ChangeMethodName;
pub use coalesce_properties::CoalesceProperties;
pub use delete_property::DeleteProperty;
pub use remove_extra_semicolons::RemoveExtraSemicolons;
