//! Shader variations.
//!
//! A [`ShaderVariation`] is a named set of preprocessor-like values that
//! identifies one permutation of a shader's programs. Every value is stored
//! as a kind tag plus its raw 32-bit pattern, and matching compares the raw
//! pattern only: a float `0.0` matches an int `0`, and a float `1.0` does not
//! match an int `1`.

use std::collections::BTreeMap;
use std::fmt;

/// Preprocessor defines handed to the program compiler, name to value text.
pub type ShaderDefines = BTreeMap<String, String>;

/// Maximum number of variations [`generate_variations`] will produce.
pub const MAX_VARIATIONS: usize = 16;

/// Value kind of a variation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Int,
    UInt,
    Float,
    Bool,
}

/// One named variation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderVariationParam {
    kind: ParamKind,
    raw: i32,
}

impl ShaderVariationParam {
    pub fn int(value: i32) -> Self {
        Self {
            kind: ParamKind::Int,
            raw: value,
        }
    }

    pub fn uint(value: u32) -> Self {
        Self {
            kind: ParamKind::UInt,
            raw: value as i32,
        }
    }

    pub fn float(value: f32) -> Self {
        Self {
            kind: ParamKind::Float,
            raw: value.to_bits() as i32,
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            kind: ParamKind::Bool,
            raw: value as i32,
        }
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Raw 32-bit pattern of the value.
    pub fn raw(&self) -> i32 {
        self.raw
    }

    pub fn as_int(&self) -> i32 {
        self.raw
    }

    pub fn as_uint(&self) -> u32 {
        self.raw as u32
    }

    pub fn as_float(&self) -> f32 {
        f32::from_bits(self.raw as u32)
    }

    pub fn as_bool(&self) -> bool {
        self.raw != 0
    }
}

impl fmt::Display for ShaderVariationParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::Int => write!(f, "{}", self.as_int()),
            ParamKind::UInt => write!(f, "{}", self.as_uint()),
            ParamKind::Float => write!(f, "{}", self.as_float()),
            ParamKind::Bool => f.write_str(if self.as_bool() { "1" } else { "0" }),
        }
    }
}

/// A set of named variation values.
///
/// # Example
///
/// ```
/// use tessel_graphics::shader::ShaderVariation;
///
/// let mut skinned = ShaderVariation::new();
/// skinned.set_bool("SKINNED", true);
/// skinned.set_int("BONES", 4);
///
/// assert_eq!(skinned.defines()["SKINNED"], "1");
/// assert_eq!(skinned.get_int("BONES"), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderVariation {
    params: BTreeMap<String, ShaderVariationParam>,
}

impl ShaderVariation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`.
    pub fn set_param(&mut self, name: &str, param: ShaderVariationParam) {
        self.params.insert(name.to_string(), param);
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.set_param(name, ShaderVariationParam::int(value));
    }

    pub fn set_uint(&mut self, name: &str, value: u32) {
        self.set_param(name, ShaderVariationParam::uint(value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_param(name, ShaderVariationParam::float(value));
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set_param(name, ShaderVariationParam::bool(value));
    }

    /// Builder form of [`set_param`](Self::set_param).
    pub fn with(mut self, name: &str, param: ShaderVariationParam) -> Self {
        self.set_param(name, param);
        self
    }

    pub fn get_param(&self, name: &str) -> Option<&ShaderVariationParam> {
        self.params.get(name)
    }

    /// Value of `name` as an int, or 0 when absent.
    pub fn get_int(&self, name: &str) -> i32 {
        self.params.get(name).map_or(0, |p| p.as_int())
    }

    pub fn get_uint(&self, name: &str) -> u32 {
        self.params.get(name).map_or(0, |p| p.as_uint())
    }

    pub fn get_float(&self, name: &str) -> f32 {
        self.params.get(name).map_or(0.0, |p| p.as_float())
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.params.get(name).is_some_and(|p| p.as_bool())
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn remove_param(&mut self, name: &str) -> Option<ShaderVariationParam> {
        self.params.remove(name)
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &ShaderVariationParam)> {
        self.params.iter().map(|(name, param)| (name.as_str(), param))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Whether every parameter of `other` is present here with the same raw
    /// value. With `exact`, both sets of names must also be equal.
    pub fn matches(&self, other: &ShaderVariation, exact: bool) -> bool {
        let covers = other
            .params
            .iter()
            .all(|(name, param)| self.params.get(name).is_some_and(|p| p.raw == param.raw));
        if !covers {
            return false;
        }
        !exact || self.params.keys().all(|name| other.params.contains_key(name))
    }

    /// Parameters as compiler defines.
    pub fn defines(&self) -> ShaderDefines {
        self.params
            .iter()
            .map(|(name, param)| (name.clone(), param.to_string()))
            .collect()
    }
}

/// Append-only list of variations. Indices are never reused.
#[derive(Debug, Clone, Default)]
pub struct ShaderVariations {
    variations: Vec<ShaderVariation>,
}

impl ShaderVariations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `variation` and return its index, even if an equal one exists.
    pub fn add(&mut self, variation: ShaderVariation) -> usize {
        self.variations.push(variation);
        self.variations.len() - 1
    }

    /// Index of the first variation exactly matching `variation`.
    pub fn find(&self, variation: &ShaderVariation) -> Option<usize> {
        self.variations.iter().position(|v| v.matches(variation, true))
    }

    pub fn get(&self, idx: usize) -> Option<&ShaderVariation> {
        self.variations.get(idx)
    }

    pub fn variations(&self) -> &[ShaderVariation] {
        &self.variations
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }
}

impl From<Vec<ShaderVariation>> for ShaderVariations {
    fn from(variations: Vec<ShaderVariation>) -> Self {
        Self { variations }
    }
}

/// A named axis of candidate values for [`generate_variations`].
#[derive(Debug, Clone, PartialEq)]
pub struct VariationAxis {
    pub name: String,
    pub values: Vec<ShaderVariationParam>,
}

impl VariationAxis {
    pub fn new(name: impl Into<String>, values: Vec<ShaderVariationParam>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// `false` and `true`.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(
            name,
            vec![ShaderVariationParam::bool(false), ShaderVariationParam::bool(true)],
        )
    }

    pub fn int(name: impl Into<String>, values: &[i32]) -> Self {
        Self::new(name, values.iter().map(|&v| ShaderVariationParam::int(v)).collect())
    }

    pub fn uint(name: impl Into<String>, values: &[u32]) -> Self {
        Self::new(name, values.iter().map(|&v| ShaderVariationParam::uint(v)).collect())
    }

    pub fn float(name: impl Into<String>, values: &[f32]) -> Self {
        Self::new(name, values.iter().map(|&v| ShaderVariationParam::float(v)).collect())
    }
}

/// Cartesian product of `axes`.
///
/// Duplicate values inside an axis are collapsed. With no axes the result is
/// a single empty variation. When the product exceeds [`MAX_VARIATIONS`]
/// nothing is generated and the result is empty; callers fall back to their
/// default variation.
pub fn generate_variations(axes: &[VariationAxis]) -> Vec<ShaderVariation> {
    let axes: Vec<(&str, Vec<ShaderVariationParam>)> = axes
        .iter()
        .map(|axis| {
            let mut values: Vec<ShaderVariationParam> = Vec::with_capacity(axis.values.len());
            for value in &axis.values {
                if !values.contains(value) {
                    values.push(*value);
                }
            }
            (axis.name.as_str(), values)
        })
        .collect();

    let total = axes
        .iter()
        .try_fold(1usize, |acc, (_, values)| acc.checked_mul(values.len()));
    match total {
        Some(total) if total <= MAX_VARIATIONS => {}
        _ => {
            log::warn!(
                "Shader variation count exceeds {} ({} axes), no variations generated",
                MAX_VARIATIONS,
                axes.len()
            );
            return Vec::new();
        }
    }

    let mut variations = vec![ShaderVariation::new()];
    for (name, values) in &axes {
        variations = variations
            .iter()
            .flat_map(|base| {
                values.iter().map(move |value| {
                    let mut variation = base.clone();
                    variation.set_param(name, *value);
                    variation
                })
            })
            .collect();
    }
    variations
}
