//! JSON encoding of non-finite floats
//!
//! JSON numbers cannot hold NaN or infinities. Saved results write NaN as
//! `null` and the infinities as the strings `"inf"` and `"-inf"`; every
//! other value is a plain number. Each encoding reads back to the same `f64`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SavedFloat {
    Number(f64),
    Text(String),
    Missing,
}

impl SavedFloat {
    fn encode(v: f64) -> Self {
        if v.is_nan() {
            SavedFloat::Missing
        } else if v == f64::INFINITY {
            SavedFloat::Text("inf".to_string())
        } else if v == f64::NEG_INFINITY {
            SavedFloat::Text("-inf".to_string())
        } else {
            SavedFloat::Number(v)
        }
    }

    fn decode<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            SavedFloat::Number(v) => Ok(v),
            SavedFloat::Missing => Ok(f64::NAN),
            SavedFloat::Text(s) => match s.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid float '{}'", other))),
            },
        }
    }
}

/// Serialize one float; used for metric values
pub(crate) fn serialize_f64<S: Serializer>(v: f64, serializer: S) -> Result<S::Ok, S::Error> {
    SavedFloat::encode(v).serialize(serializer)
}

/// `metric -> value` maps
pub(crate) mod map {
    use super::*;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(k, v)| (k, SavedFloat::encode(*v))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, f64>, D::Error> {
        BTreeMap::<String, SavedFloat>::deserialize(deserializer)?
            .into_iter()
            .map(|(k, v)| Ok((k, v.decode::<D::Error>()?)))
            .collect()
    }
}

/// `metric -> values` maps, e.g. outlier lists
pub(crate) mod list_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<f64>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(k, values)| {
            let encoded: Vec<SavedFloat> = values.iter().copied().map(SavedFloat::encode).collect();
            (k, encoded)
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<f64>>, D::Error> {
        BTreeMap::<String, Vec<SavedFloat>>::deserialize(deserializer)?
            .into_iter()
            .map(|(k, values)| {
                let decoded = values
                    .into_iter()
                    .map(SavedFloat::decode::<D::Error>)
                    .collect::<Result<Vec<_>, D::Error>>()?;
                Ok((k, decoded))
            })
            .collect()
    }
}
