pub mod countries;
pub mod suggestions;
pub mod validation;
