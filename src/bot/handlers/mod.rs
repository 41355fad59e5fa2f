//! Discord interaction handlers
//!
//! Handlers for interactions other than commands, such as autocomplete.

/// Autocomplete handlers for drink and inventory names
pub mod autocomplete;
