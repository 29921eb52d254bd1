use serde::{de::DeserializeOwned, de::SeqAccess, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Top-level animation description for the character rig.
///
/// Only the subset of the Lottie schema that drives layer transforms is modelled;
/// shape, mask and effect data is ignored on load.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LottieJson {
    #[serde(default)]
    pub v: Option<String>,
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub ip: f32,
    #[serde(default)]
    pub op: f32,
    pub fr: f32,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub h: u32,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl LottieJson {
    pub fn duration_frames(&self) -> f32 {
        (self.op - self.ip).max(0.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Layer {
    #[serde(default)]
    pub ty: u8, // 0 = precomp, 3 = null, 4 = shape ...
    #[serde(default)]
    pub ind: Option<u32>,
    #[serde(default)]
    pub parent: Option<u32>,
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub st: f32, // Precomp local time offset
    #[serde(default)]
    pub ks: Transform,
    #[serde(default, rename = "refId")]
    pub ref_id: Option<String>,
}

impl Layer {
    pub fn name(&self) -> &str {
        self.nm.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Transform {
    #[serde(default)]
    pub a: Property<Vec3DefaultZero>, // Anchor
    #[serde(default)]
    pub p: PositionProperty,
    #[serde(default)]
    pub s: Property<Vec3Scale>, // Percent
    #[serde(default, alias = "rz")]
    pub r: Property<f32>, // Degrees, clockwise on screen
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum PositionProperty {
    // Split must be tried first: every field of `Property` has a default.
    Split {
        x: Property<f32>,
        y: Property<f32>,
    },
    Unified(Property<Vec3DefaultZero>),
}

impl Default for PositionProperty {
    fn default() -> Self {
        PositionProperty::Unified(Property::default())
    }
}

/// One animatable property track.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Property<T> {
    #[serde(default)]
    pub a: u8,
    #[serde(default)]
    #[serde(bound(deserialize = "T: DeserializeOwned"))]
    pub k: Value<T>,
}

impl<T> Property<T> {
    pub fn constant(value: T) -> Self {
        Property {
            a: 0,
            k: Value::Static(value),
        }
    }

    pub fn animated(keyframes: Vec<Keyframe<T>>) -> Self {
        Property {
            a: 1,
            k: Value::Animated(keyframes),
        }
    }

    /// True when the track carries neither a constant nor any keyframe.
    pub fn is_malformed(&self) -> bool {
        match &self.k {
            Value::Default => true,
            Value::Static(_) => false,
            Value::Animated(keyframes) => keyframes.iter().all(|kf| kf.s.is_none()),
        }
    }
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Property {
            a: 0,
            k: Value::Default,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub enum Value<T> {
    Default,
    Static(T),
    Animated(Vec<Keyframe<T>>),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Value<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;

        if v.is_null() {
            return Ok(Value::Default);
        }

        // Keyframe lists are arrays of objects; plain arrays of numbers are vectors.
        let is_keyframe_list = v
            .as_array()
            .is_some_and(|arr| arr.first().is_some_and(serde_json::Value::is_object));
        if is_keyframe_list {
            // A broken keyframe list degrades the track, not the whole document.
            return Ok(serde_json::from_value::<Vec<Keyframe<T>>>(v)
                .map(Value::Animated)
                .unwrap_or(Value::Default));
        }

        if v.as_array().is_some_and(Vec::is_empty) {
            return Ok(Value::Animated(Vec::new()));
        }

        if let Ok(val) = serde_json::from_value::<T>(v.clone()) {
            return Ok(Value::Static(val));
        }

        // Single-element wrapping, e.g. rotation authored as [15].
        if let Ok(vec) = serde_json::from_value::<Vec<T>>(v) {
            if let Some(first) = vec.into_iter().next() {
                return Ok(Value::Static(first));
            }
        }

        Ok(Value::Default)
    }
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Value::Default
    }
}

/// A `(frame, value)` sample. `e` is the legacy segment end value.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Keyframe<T> {
    #[serde(rename = "t")]
    pub frame: f32,
    #[serde(default, deserialize_with = "deserialize_keyframe_value")]
    pub s: Option<T>,
    #[serde(default, deserialize_with = "deserialize_keyframe_value")]
    pub e: Option<T>,
}

impl<T> Keyframe<T> {
    pub fn new(frame: f32, value: T) -> Self {
        Keyframe {
            frame,
            s: Some(value),
            e: None,
        }
    }
}

fn deserialize_keyframe_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    if v.is_null() {
        return Ok(None);
    }

    if let Ok(val) = serde_json::from_value(v.clone()) {
        return Ok(Some(val));
    }

    if let Ok(vec) = serde_json::from_value::<Vec<T>>(v) {
        if let Some(first) = vec.into_iter().next() {
            return Ok(Some(first));
        }
    }

    Ok(None)
}

pub type Vec3 = [f32; 3];

/// Vector value whose missing trailing components are 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3DefaultZero(pub Vec3);

impl Default for Vec3DefaultZero {
    fn default() -> Self {
        Vec3DefaultZero([0.0, 0.0, 0.0])
    }
}

impl<'de> Deserialize<'de> for Vec3DefaultZero {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(PaddedVecVisitor)
            .map(Vec3DefaultZero)
    }
}

/// Scale value in percent. A lone scalar is applied uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3Scale(pub Vec3);

impl Default for Vec3Scale {
    fn default() -> Self {
        Vec3Scale([100.0, 100.0, 100.0])
    }
}

impl<'de> Deserialize<'de> for Vec3Scale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(PaddedVecVisitor)
            .map(Vec3Scale)
    }
}

struct PaddedVecVisitor;

impl<'de> serde::de::Visitor<'de> for PaddedVecVisitor {
    type Value = Vec3;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a sequence of up to 3 numbers")
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        let v = v as f32;
        Ok([v, v, v])
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let x = seq.next_element()?.unwrap_or(0.0);
        let y = seq.next_element()?.unwrap_or(0.0);
        let z = seq.next_element()?.unwrap_or(0.0);
        while seq.next_element::<f32>()?.is_some() {}
        Ok([x, y, z])
    }
}

/// Library entry. Only entries carrying `layers` are compositions.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub layers: Option<Vec<Layer>>,
    #[serde(default)]
    pub w: Option<u32>,
    #[serde(default)]
    pub h: Option<u32>,
}
