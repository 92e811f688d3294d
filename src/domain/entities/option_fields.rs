use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::ValidateLength;

/// Tri-state field for partial updates.
///
/// - `Unchanged` → key absent from the request, left out of the backend patch
/// - `SetToNull` → explicit `null`, clears the column
/// - `SetToValue` → new value
///
/// Pair with `#[serde(default, skip_serializing_if = "OptionField::is_unchanged")]`
/// so absent keys stay absent on the way out.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionField<T> {
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<T> Default for OptionField<T> {
    fn default() -> Self {
        OptionField::Unchanged
    }
}

impl<T: Serialize> Serialize for OptionField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionField::SetToValue(value) => value.serialize(serializer),
            // `Unchanged` is normally skipped by the container attribute.
            OptionField::Unchanged | OptionField::SetToNull => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptionField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

impl<T> ValidateLength<u64> for OptionField<T>
where
    T: ValidateLength<u64>
{
    fn length(&self) -> Option<u64> {
        match self {
            OptionField::SetToValue(value) => value.length(),
            _ => None,
        }
    }
    fn validate_length(&self, min: Option<u64>, max: Option<u64>, equal: Option<u64>) -> bool {
        match self {
            OptionField::SetToValue(value) => value.validate_length(min, max, equal),
            _ => true,
        }
    }
}

impl<T> OptionField<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn is_set_to_null(&self) -> bool {
        matches!(self, Self::SetToNull)
    }

    /// Transform the inner value, keeping the tri-state.
    pub fn map_value<U, F: FnOnce(T) -> U>(self, f: F) -> OptionField<U> {
        match self {
            Self::Unchanged => OptionField::Unchanged,
            Self::SetToNull => OptionField::SetToNull,
            Self::SetToValue(v) => OptionField::SetToValue(f(v)),
        }
    }
}

impl OptionField<String> {
    /// Collapses blank text into `SetToNull`, the column-level meaning of
    /// an emptied optional form field.
    pub fn blank_as_null(self) -> Self {
        match self {
            Self::SetToValue(v) if v.trim().is_empty() => Self::SetToNull,
            Self::SetToValue(v) => Self::SetToValue(v.trim().to_string()),
            other => other,
        }
    }
}

impl<T> From<Option<T>> for OptionField<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => OptionField::SetToValue(v),
            None => OptionField::SetToNull,
        }
    }
}
