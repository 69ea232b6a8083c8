//! The uniform outcome envelope.
//!
//! Every action result crosses the boundary as `{"success": true, "data": ..}`
//! or `{"success": false, "error": {"kind": .., "message": ..}}`. Inside the
//! workspace the same result travels as `Result<T, ActionError>`; this type
//! is the wire form of that result, nothing more.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::ActionError;

/// Wire form of an action result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(ActionError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn into_result(self) -> Result<T, ActionError> {
        match self {
            Outcome::Success(data) => Ok(data),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, ActionError>> for Outcome<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Outcome::Success(data),
            Err(error) => Outcome::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Outcome::Success(data) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            Outcome::Failure(error) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Outcome<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<T> {
            success: bool,
            data: Option<T>,
            error: Option<ActionError>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        match (raw.success, raw.data, raw.error) {
            (true, Some(data), _) => Ok(Outcome::Success(data)),
            (false, _, Some(error)) => Ok(Outcome::Failure(error)),
            (true, None, _) => Err(de::Error::missing_field("data")),
            (false, _, None) => Err(de::Error::missing_field("error")),
        }
    }
}
