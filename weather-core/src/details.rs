//! A single weather condition, the elements of the `weather` array in an
//! OpenWeatherMap response.
//!
//! Inbound records carry an icon token (`"icon": "10d"`); the stored record
//! and everything written back out carry the resolved icon path instead.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, DeserializeSeed, MapAccess, Unexpected, Visitor},
    ser::SerializeMap,
};
use serde_json::{Number, Value};

use crate::{
    error::{Result, WeatherError},
    fields::{self, FIELDS, Field},
    icon::{IconManager, IconResolver},
};

/// Fields outside the known schema, kept so they can be written back out.
pub type AdditionalProperties = IndexMap<String, Value>;

#[derive(Debug, Clone)]
pub struct WeatherDetails {
    id: Option<i64>,
    weather_summary: String,
    weather_description: String,
    icon_path: String,
    additional_properties: AdditionalProperties,
}

impl WeatherDetails {
    /// Build a record, resolving `icon_token` through the process-wide
    /// [`IconManager`].
    pub fn new(
        id: Option<i64>,
        summary: impl Into<String>,
        description: impl Into<String>,
        icon_token: &str,
    ) -> Self {
        Self::with_resolver(id, summary, description, icon_token, IconManager::instance())
    }

    pub fn with_resolver(
        id: Option<i64>,
        summary: impl Into<String>,
        description: impl Into<String>,
        icon_token: &str,
        resolver: &dyn IconResolver,
    ) -> Self {
        Self {
            id,
            weather_summary: summary.into(),
            weather_description: description.into(),
            icon_path: resolver.path_for_id(icon_token),
            additional_properties: AdditionalProperties::new(),
        }
    }

    pub fn builder() -> WeatherDetailsBuilder {
        WeatherDetailsBuilder::default()
    }

    /// Parse one record, resolving its icon through the process-wide manager.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_str_with(json: &str, resolver: &dyn IconResolver) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        let details = WeatherDetailsSeed::new(resolver).deserialize(&mut de)?;
        de.end()?;
        Ok(details)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Weather condition code.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Group of weather parameters (Rain, Snow, Extreme, ...).
    pub fn weather_summary(&self) -> &str {
        &self.weather_summary
    }

    /// Condition within the group, localized by the provider.
    pub fn weather_description(&self) -> &str {
        &self.weather_description
    }

    pub fn icon_path(&self) -> &str {
        &self.icon_path
    }

    pub fn additional_properties(&self) -> &AdditionalProperties {
        &self.additional_properties
    }

    /// Add or replace an unrecognized field, returning the previous value.
    ///
    /// A null value removes the entry, since nulls are never written out.
    /// Keys of known fields are rejected.
    pub fn insert_additional_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        put_property(&mut self.additional_properties, key.into(), value.into())
    }
}

fn put_property(
    properties: &mut AdditionalProperties,
    key: String,
    value: Value,
) -> Result<Option<Value>> {
    if fields::is_reserved(&key) {
        return Err(WeatherError::ReservedKey(key));
    }
    if value.is_null() {
        return Ok(properties.shift_remove(&key));
    }
    Ok(properties.insert(key, value))
}

/// Collects the parts of a [`WeatherDetails`]; the record only exists once
/// all required parts are present.
#[derive(Debug, Clone, Default)]
pub struct WeatherDetailsBuilder {
    id: Option<i64>,
    summary: Option<String>,
    description: Option<String>,
    icon: Option<String>,
    additional_properties: AdditionalProperties,
    reserved_key: Option<String>,
}

impl WeatherDetailsBuilder {
    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The raw icon token, resolved when the record is built.
    pub fn icon(mut self, token: impl Into<String>) -> Self {
        self.icon = Some(token.into());
        self
    }

    /// Same rules as [`WeatherDetails::insert_additional_property`]; a
    /// reserved key makes the build fail.
    pub fn additional_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        match put_property(&mut self.additional_properties, key.into(), value.into()) {
            Err(WeatherError::ReservedKey(key)) if self.reserved_key.is_none() => {
                self.reserved_key = Some(key);
            }
            _ => {}
        }
        self
    }

    pub fn build(self) -> Result<WeatherDetails> {
        self.build_with(IconManager::instance())
    }

    pub fn build_with(self, resolver: &dyn IconResolver) -> Result<WeatherDetails> {
        if let Some(key) = self.reserved_key {
            return Err(WeatherError::ReservedKey(key));
        }
        let weather_summary = self
            .summary
            .ok_or(WeatherError::MissingField(Field::Summary.canonical()))?;
        let weather_description = self
            .description
            .ok_or(WeatherError::MissingField(Field::Description.canonical()))?;
        let icon = self.icon.ok_or(WeatherError::MissingField(Field::Icon.canonical()))?;

        Ok(WeatherDetails {
            id: self.id,
            weather_summary,
            weather_description,
            icon_path: resolver.path_for_id(&icon),
            additional_properties: self.additional_properties,
        })
    }
}

impl Serialize for WeatherDetails {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        for spec in &FIELDS {
            match spec.field {
                Field::Id => match self.id {
                    Some(id) => map.serialize_entry(spec.output, &id)?,
                    None if spec.omit_if_absent => {}
                    None => map.serialize_entry(spec.output, &())?,
                },
                Field::Summary => map.serialize_entry(spec.output, &self.weather_summary)?,
                Field::Description => {
                    map.serialize_entry(spec.output, &self.weather_description)?
                }
                Field::Icon => map.serialize_entry(spec.output, &self.icon_path)?,
            }
        }

        for (key, value) in &self.additional_properties {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for WeatherDetails {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WeatherDetailsSeed::new(IconManager::instance()).deserialize(deserializer)
    }
}

/// Deserializes a [`WeatherDetails`] with an explicit icon resolver instead
/// of the process-wide one.
#[derive(Clone, Copy)]
pub struct WeatherDetailsSeed<'r> {
    resolver: &'r dyn IconResolver,
}

impl<'r> WeatherDetailsSeed<'r> {
    pub fn new(resolver: &'r dyn IconResolver) -> Self {
        Self { resolver }
    }
}

impl<'de> DeserializeSeed<'de> for WeatherDetailsSeed<'_> {
    type Value = WeatherDetails;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DetailsVisitor { resolver: self.resolver })
    }
}

struct DetailsVisitor<'r> {
    resolver: &'r dyn IconResolver,
}

impl<'de> Visitor<'de> for DetailsVisitor<'_> {
    type Value = WeatherDetails;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a weather condition object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut builder = WeatherDetailsBuilder::default();
        let mut id_seen = false;

        while let Some(key) = map.next_key::<String>()? {
            match fields::lookup(&key) {
                Some(Field::Id) => {
                    if id_seen {
                        return Err(de::Error::duplicate_field(Field::Id.canonical()));
                    }
                    id_seen = true;
                    builder.id = map
                        .next_value::<Option<Number>>()?
                        .map(integral_id::<A::Error>)
                        .transpose()?;
                }
                Some(field @ Field::Summary) => {
                    set_once(&mut builder.summary, field, map.next_value()?)?
                }
                Some(field @ Field::Description) => {
                    set_once(&mut builder.description, field, map.next_value()?)?
                }
                Some(field @ Field::Icon) => set_once(&mut builder.icon, field, map.next_value()?)?,
                None => {
                    let value: Value = map.next_value()?;
                    // nulls are never written out, so never kept
                    if !value.is_null() {
                        builder.additional_properties.insert(key, value);
                    }
                }
            }
        }

        builder.build_with(self.resolver).map_err(|err| match err {
            WeatherError::MissingField(field) => de::Error::missing_field(field),
            other => de::Error::custom(other),
        })
    }
}

/// Condition codes are integers, but integral floats such as `800.0` are
/// accepted too.
fn integral_id<E: de::Error>(n: Number) -> Result<i64, E> {
    if let Some(id) = n.as_i64() {
        return Ok(id);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        Some(f) => Err(E::invalid_value(
            Unexpected::Float(f),
            &"an integral weather condition id",
        )),
        None => Err(E::invalid_value(
            Unexpected::Other("number"),
            &"an integral weather condition id",
        )),
    }
}

/// A field given under both its canonical name and an alias is rejected.
fn set_once<E: de::Error>(slot: &mut Option<String>, field: Field, value: String) -> Result<(), E> {
    if slot.is_some() {
        return Err(E::duplicate_field(field.canonical()));
    }
    *slot = Some(value);
    Ok(())
}

impl PartialEq for WeatherDetails {
    fn eq(&self, other: &Self) -> bool {
        self.icon_path == other.icon_path
            && self.weather_description == other.weather_description
            && self.weather_summary == other.weather_summary
            && self.id == other.id
            && self.additional_properties == other.additional_properties
    }
}

impl Eq for WeatherDetails {}

impl Hash for WeatherDetails {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.icon_path.hash(state);
        self.weather_description.hash(state);
        self.weather_summary.hash(state);
        self.id.hash(state);
        hash_entries(self.additional_properties.iter(), state);
    }
}

/// Map equality ignores insertion order, so entries are hashed sorted by key.
fn hash_entries<'a, H: Hasher>(entries: impl Iterator<Item = (&'a String, &'a Value)>, state: &mut H) {
    let mut sorted: Vec<_> = entries.collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    state.write_usize(sorted.len());
    for (key, value) in sorted {
        key.hash(state);
        hash_value(value, state);
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.hash(state);
            } else if let Some(u) = n.as_u64() {
                u.hash(state);
            } else if let Some(f) = n.as_f64() {
                // 0.0 == -0.0
                let f = if f == 0.0 { 0.0 } else { f };
                f.to_bits().hash(state);
            }
        }
        Value::String(s) => s.hash(state),
        Value::Array(items) => {
            state.write_usize(items.len());
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => hash_entries(map.iter(), state),
    }
}

impl fmt::Display for WeatherDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeatherDetails[id=")?;
        match self.id {
            Some(id) => write!(f, "{id}")?,
            None => f.write_str("<null>")?,
        }
        write!(
            f,
            ",main={},weatherDescription={},icon={},additionalProperties={{",
            self.weather_summary, self.weather_description, self.icon_path
        )?;
        for (i, (key, value)) in self.additional_properties.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Value::String(s) => write!(f, "{key}={s}")?,
                other => write!(f, "{key}={other}")?,
            }
        }
        f.write_str("}]")
    }
}
