//! The structured data tree that option values, config files and generated
//! objects are expressed in.
//!
//! [`Data`] is a plain JSON/YAML-like tree with one extra variant,
//! [`Data::Omitted`], which marks a node that must not appear in the output at
//! all. Omitted nodes are produced from disabled [`ConditionalValue`]s and are
//! erased by [`Data::prune`] (and skipped by the [`Serialize`] impl) before
//! anything is written out.
use std::fmt;

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, SeqAccess, Visitor},
};

/// Ordered mapping used for [`Data::Mapping`].
pub type Mapping = IndexMap<String, Data>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Data {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Data>),
    Mapping(Mapping),
    /// A node that is erased from its parent before serialization.
    Omitted,
}

impl Data {
    /// Creates an empty mapping.
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// Converts any serializable value (for example a typed Kubernetes object)
    /// into a data tree. Field order of the source type is kept.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Converts this tree into a typed value, e.g. a `ResourceRequirements`.
    pub fn deserialize_into<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::from(self.clone()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Data> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Looks up a value by a JSON-pointer-like path (`/spec/template/metadata`).
    ///
    /// Sequence elements are addressed by their index. Omitted nodes are never
    /// returned.
    pub fn pointer(&self, pointer: &str) -> Option<&Data> {
        let mut current = self;
        for segment in pointer.split('/').skip(1) {
            current = match current {
                Self::Mapping(map) => map.get(segment)?,
                Self::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        (!current.is_omitted()).then_some(current)
    }

    /// Mutable counterpart of [`Data::pointer`].
    pub fn pointer_mut(&mut self, pointer: &str) -> Option<&mut Data> {
        let mut current = self;
        for segment in pointer.split('/').skip(1) {
            current = match current {
                Self::Mapping(map) => map.get_mut(segment)?,
                Self::Sequence(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        (!current.is_omitted()).then_some(current)
    }

    /// Deep merges `other` into `self`.
    ///
    /// Mappings are merged key by key, recursively. Any other value at a
    /// colliding key is replaced by the one from `other`. Omitted values in
    /// `other` never replace anything.
    pub fn merge(&mut self, other: &Data) {
        match (self, other) {
            (_, Self::Omitted) => {}
            (Self::Mapping(base), Self::Mapping(overrides)) => {
                for (key, value) in overrides {
                    match base.get_mut(key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            if !value.is_omitted() {
                                base.insert(key.clone(), value.clone());
                            }
                        }
                    }
                }
            }
            (base, value) => *base = value.clone(),
        }
    }

    /// Erases every [`Data::Omitted`] node from mappings and sequences.
    pub fn prune(&mut self) {
        match self {
            Self::Mapping(map) => {
                map.retain(|_, value| !value.is_omitted());
                map.values_mut().for_each(Self::prune);
            }
            Self::Sequence(items) => {
                items.retain(|value| !value.is_omitted());
                items.iter_mut().for_each(Self::prune);
            }
            _ => {}
        }
    }

    pub fn pruned(mut self) -> Self {
        self.prune();
        self
    }

    /// Erases [`Data::Null`] entries from mappings, recursively.
    ///
    /// Formats without a null value, such as TOML, treat an unset key as
    /// null.
    pub fn remove_nulls(&mut self) {
        match self {
            Self::Mapping(map) => {
                map.retain(|_, value| !value.is_null());
                map.values_mut().for_each(Self::remove_nulls);
            }
            Self::Sequence(items) => items.iter_mut().for_each(Self::remove_nulls),
            _ => {}
        }
    }
}

/// A value that is only part of its parent structure while enabled.
///
/// Converting a disabled value into [`Data`] yields [`Data::Omitted`];
/// [`ConditionalValue::into_option`] yields [`None`], which typed Kubernetes
/// structs skip during serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionalValue<T> {
    value: Option<T>,
    enabled: bool,
}

impl<T> ConditionalValue<T> {
    pub fn new(value: T, enabled: bool) -> Self {
        Self {
            value: Some(value),
            enabled,
        }
    }

    /// Enabled iff `value` is present.
    pub fn disabled_if_none(value: Option<T>) -> Self {
        Self {
            enabled: value.is_some(),
            value,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.value.is_some()
    }

    pub fn into_option(self) -> Option<T> {
        if self.enabled { self.value } else { None }
    }
}

impl<T: Into<Data>> From<ConditionalValue<T>> for Data {
    fn from(value: ConditionalValue<T>) -> Self {
        value.into_option().map_or(Self::Omitted, Into::into)
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Data {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Data {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u16> for Data {
    fn from(value: u16) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Data>> From<Vec<T>> for Data {
    fn from(value: Vec<T>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for Data {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl<T: Into<Data>> From<Option<T>> for Data {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Data>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Mapping(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(int) => Self::Int(int),
                None => number.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Data> for serde_json::Value {
    fn from(value: Data) -> Self {
        match value {
            Data::Null | Data::Omitted => Self::Null,
            Data::Bool(value) => Self::Bool(value),
            Data::Int(value) => Self::from(value),
            Data::Float(value) => Self::from(value),
            Data::String(value) => Self::String(value),
            Data::Sequence(items) => Self::Array(
                items
                    .into_iter()
                    .filter(|item| !item.is_omitted())
                    .map(Self::from)
                    .collect(),
            ),
            Data::Mapping(map) => Self::Object(
                map.into_iter()
                    .filter(|(_, value)| !value.is_omitted())
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::Omitted => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::Sequence(items) => {
                serializer.collect_seq(items.iter().filter(|item| !item.is_omitted()))
            }
            Self::Mapping(map) => {
                serializer.collect_map(map.iter().filter(|(_, value)| !value.is_omitted()))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Data {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DataVisitor)
    }
}

struct DataVisitor;

impl<'de> Visitor<'de> for DataVisitor {
    type Value = Data;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any YAML or JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<Data, E> {
        Ok(Data::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Data, E> {
        Ok(Data::Int(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Data, E> {
        Ok(i64::try_from(value).map_or(Data::Float(value as f64), Data::Int))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Data, E> {
        Ok(Data::Float(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<Data, E> {
        Ok(Data::String(value.to_owned()))
    }

    fn visit_string<E>(self, value: String) -> Result<Data, E> {
        Ok(Data::String(value))
    }

    fn visit_unit<E>(self) -> Result<Data, E> {
        Ok(Data::Null)
    }

    fn visit_none<E>(self) -> Result<Data, E> {
        Ok(Data::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Data, D::Error> {
        Data::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Data, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Data::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Data, A::Error> {
        let mut map = Mapping::with_capacity(access.size_hint().unwrap_or_default());
        while let Some((key, value)) = access.next_entry::<String, Data>()? {
            map.insert(key, value);
        }
        Ok(Data::Mapping(map))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn baseline() -> Data {
        Data::from_iter([(
            "global",
            Data::from_iter([("checkNewVersion", false), ("sendAnonymousUsage", false)]),
        )])
    }

    #[test]
    fn merge_overwrites_only_colliding_leaf() {
        let mut data = baseline();
        data.merge(&Data::from_iter([(
            "global",
            Data::from_iter([("checkNewVersion", true)]),
        )]));

        assert_eq!(
            data.pointer("/global/checkNewVersion"),
            Some(&Data::Bool(true))
        );
        assert_eq!(
            data.pointer("/global/sendAnonymousUsage"),
            Some(&Data::Bool(false))
        );
    }

    #[test]
    fn merge_replaces_non_mapping_values() {
        let mut data = Data::from_iter([("entryPoints", Data::from(vec!["web"]))]);
        data.merge(&Data::from_iter([(
            "entryPoints",
            Data::from_iter([("web", Data::from_iter([("address", ":80")]))]),
        )]));

        assert_eq!(
            data.pointer("/entryPoints/web/address"),
            Some(&Data::from(":80"))
        );
    }

    #[test]
    fn merge_ignores_omitted_overrides() {
        let mut data = baseline();
        data.merge(&Data::from_iter([("global", Data::Omitted)]));
        assert_eq!(data, baseline());
    }

    #[test]
    fn disabled_conditional_value_is_erased() {
        let mut data = Data::from_iter([
            ("name", Data::from("traefik")),
            (
                "annotations",
                ConditionalValue::new(Data::from_iter([("a", "b")]), false).into(),
            ),
            (
                "resources",
                ConditionalValue::<Data>::disabled_if_none(None).into(),
            ),
            (
                "args",
                Data::Sequence(vec![Data::from("--a"), Data::Omitted, Data::from("--b")]),
            ),
        ]);
        data.prune();

        let expected = Data::from_iter([
            ("name", Data::from("traefik")),
            ("args", Data::from(vec!["--a", "--b"])),
        ]);
        assert_eq!(data, expected);
    }

    #[test]
    fn pointer_mut_reaches_sequence_elements() {
        let mut data = Data::from_iter([(
            "containers",
            Data::from(vec![Data::from_iter([("name", "traefik")])]),
        )]);
        data.pointer_mut("/containers/0")
            .unwrap()
            .merge(&Data::from_iter([("image", "traefik:v2.2")]));

        assert_eq!(
            data.pointer("/containers/0/image"),
            Some(&Data::from("traefik:v2.2"))
        );
        assert!(data.pointer_mut("/containers/1").is_none());
    }

    #[test]
    fn remove_nulls_keeps_other_values() {
        let mut data = Data::from_iter([
            (
                "log",
                Data::from_iter([("level", Data::Null), ("format", Data::from("json"))]),
            ),
            ("api", Data::Null),
        ]);
        data.remove_nulls();

        assert_eq!(
            data,
            Data::from_iter([("log", Data::from_iter([("format", "json")]))])
        );
    }

    #[test]
    fn serialization_skips_omitted_nodes() {
        let data = Data::from_iter([
            ("kept", Data::from(1)),
            ("dropped", ConditionalValue::new(Data::from(2), false).into()),
        ]);

        let yaml = serde_yaml::to_string(&data).unwrap();
        assert_eq!(yaml, "kept: 1\n");
    }

    #[test]
    fn enabled_conditional_value_is_kept() {
        let value = ConditionalValue::new("sa", true);
        assert!(value.is_enabled());
        assert_eq!(Data::from(value), Data::from("sa"));
        assert_eq!(
            ConditionalValue::disabled_if_none(Some(3)).into_option(),
            Some(3)
        );
    }

    #[test]
    fn deserialize_keeps_key_order() {
        let data: Data = serde_yaml::from_str(indoc! {"
            zeta: 1
            alpha:
              - true
              - 1.5
              - text
            middle: ~
        "})
        .unwrap();

        let keys: Vec<_> = data.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha", "middle"]);
        assert_eq!(data.pointer("/alpha/1"), Some(&Data::Float(1.5)));
        assert_eq!(data.pointer("/middle"), Some(&Data::Null));
    }
}
