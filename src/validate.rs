//! Required-field validation.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::FieldDescriptor;
use crate::tree::{ConfigTree, is_zero, slots};
use tracing::warn;

/// Fail with one aggregated error if any required field is still zero.
///
/// Fields inside sequences are checked per element, so the reported paths carry
/// element indices (`contacts[1].email`).
pub fn validate(descriptors: &[FieldDescriptor], tree: &ConfigTree) -> ConfigResult<()> {
    let missing: Vec<String> = descriptors
        .iter()
        .filter(|d| d.required)
        .flat_map(|d| slots(tree, &d.path))
        .filter(|(_, value)| is_zero(value))
        .map(|(at, _)| at.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    for path in &missing {
        warn!(field = %path, "required configuration field is not set");
    }
    Err(ConfigError::Validation { missing })
}
