//! Decoders for fields the API renders inconsistently.
//!
//! Some endpoints send `""` where an empty array or object belongs (for
//! example `asset_groups` from the single-asset endpoint and `asset_info`
//! from the asset listing). The wrappers here accept a string, or `null`, in
//! place of the container and decode it as empty. Any other mismatched shape
//! is still a decode error.

use serde::de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

/// Deserializes `null` as `T::default()`.
///
/// For plain collection fields where the API sends `null` for "none".
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    let opt = <Option<T> as Deserialize>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// A JSON array that may arrive as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmptyStrAsVec<T = String>(pub Vec<T>);

/// A JSON object that may arrive as a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmptyStrAsMap(pub Map<String, Value>);

impl<T> Default for EmptyStrAsVec<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for EmptyStrAsVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T> DerefMut for EmptyStrAsVec<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for EmptyStrAsVec<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T> From<EmptyStrAsVec<T>> for Vec<T> {
    fn from(values: EmptyStrAsVec<T>) -> Self {
        values.0
    }
}

impl Deref for EmptyStrAsMap {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl DerefMut for EmptyStrAsMap {
    fn deref_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }
}

impl From<Map<String, Value>> for EmptyStrAsMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

struct VecVisitor<T>(PhantomData<T>);

impl<'de, T: DeserializeOwned> Visitor<'de> for VecVisitor<T> {
    type Value = EmptyStrAsVec<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array or a string")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(EmptyStrAsVec(values))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(EmptyStrAsVec::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EmptyStrAsVec::default())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for EmptyStrAsVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VecVisitor(PhantomData))
    }
}

struct MapVisitor;

impl<'de> Visitor<'de> for MapVisitor {
    type Value = EmptyStrAsMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object or a string")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(EmptyStrAsMap(map))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(EmptyStrAsMap::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EmptyStrAsMap::default())
    }
}

impl<'de> Deserialize<'de> for EmptyStrAsMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Record {
        #[serde(default)]
        groups: EmptyStrAsVec,
        #[serde(default)]
        info: EmptyStrAsMap,
    }

    #[test]
    fn test_empty_string_as_empty_vec() {
        let v: EmptyStrAsVec = serde_json::from_str(r#""""#).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn test_array_keeps_order() {
        let v: EmptyStrAsVec = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(v.0, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_null_as_empty_vec() {
        let v: EmptyStrAsVec = serde_json::from_str("null").unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn test_vec_rejects_other_shapes() {
        assert!(serde_json::from_str::<EmptyStrAsVec>("42").is_err());
        assert!(serde_json::from_str::<EmptyStrAsVec>(r#"{"a":1}"#).is_err());
        assert!(serde_json::from_str::<EmptyStrAsVec>("[1,2]").is_err());
    }

    #[test]
    fn test_empty_string_as_empty_map() {
        let m: EmptyStrAsMap = serde_json::from_str(r#""""#).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn test_object_kept() {
        let m: EmptyStrAsMap = serde_json::from_str(r#"{"k":"v"}"#).unwrap();
        assert_eq!(m.get("k"), Some(&json!("v")));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_map_rejects_arrays() {
        assert!(serde_json::from_str::<EmptyStrAsMap>("[]").is_err());
    }

    #[test]
    fn test_anomaly_inside_record_does_not_fail_decode() {
        let r: Record = serde_json::from_value(json!({"groups": "", "info": ""})).unwrap();
        assert!(r.groups.is_empty());
        assert!(r.info.is_empty());

        let r: Record = serde_json::from_value(json!({})).unwrap();
        assert!(r.groups.is_empty());
    }

    #[test]
    fn test_null_as_default_for_plain_vec() {
        #[derive(Deserialize)]
        struct Users {
            #[serde(default, deserialize_with = "null_as_default")]
            users: Vec<String>,
        }

        let u: Users = serde_json::from_str(r#"{"users":null}"#).unwrap();
        assert!(u.users.is_empty());
        let u: Users = serde_json::from_str(r#"{"users":["root"]}"#).unwrap();
        assert_eq!(u.users, vec!["root".to_string()]);
    }

    #[test]
    fn test_serializes_as_inner_container() {
        let v = EmptyStrAsVec(vec!["x".to_string()]);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(["x"]));
        assert_eq!(
            serde_json::to_value(EmptyStrAsMap::default()).unwrap(),
            json!({})
        );
    }
}
