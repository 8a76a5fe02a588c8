pub mod audio;
pub mod interview;
pub mod resume;
pub mod task;

use serde::{Deserialize, Deserializer};

/// Deserializes `null` as the type's default. Provider output routinely
/// sends `null` for fields the candidate's resume simply doesn't have.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
