use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field.
/// Keeps one bad entry from failing the decode of the whole file.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
