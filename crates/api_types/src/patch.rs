//! Sparse field wrapper used by partial-update request bodies.
//!
//! A JSON body only "supplies" the keys it actually contains. Serde cannot
//! tell `{}` from `{"notes": null}` with a plain `Option`, so update bodies
//! declare their fields as `Patch<T>` with `#[serde(default)]`:
//!
//! - key missing → [`Patch::Absent`], the stored value is left alone,
//! - key present → [`Patch::Present`], even when the value is `0`, `false`
//!   or (for `Patch<Option<T>>`) `null`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Present(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Present(value) => Patch::Present(value),
        }
    }

    /// The supplied value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Absent => None,
            Self::Present(value) => Some(value),
        }
    }

    /// The supplied value, or `current` when the field was not supplied.
    pub fn or<'a>(&'a self, current: &'a T) -> &'a T {
        match self {
            Self::Absent => current,
            Self::Present(value) => value,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Present)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Present(value) => value.serialize(serializer),
        }
    }
}
