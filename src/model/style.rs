//! Box-model style properties, style maps and style deltas
//!
//! Style values are stored the way a host keeps them (`"12px"`, `"auto"`,
//! `"100%"`). The engine reads them through [`parse_px`], which treats
//! anything malformed as `0` instead of failing.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A box-model property the engine reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
    Position,
    Left,
    Top,
    Right,
    Bottom,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
}

impl Property {
    pub const ALL: [Property; 21] = [
        Property::Position,
        Property::Left,
        Property::Top,
        Property::Right,
        Property::Bottom,
        Property::Width,
        Property::Height,
        Property::MinWidth,
        Property::MinHeight,
        Property::MarginTop,
        Property::MarginRight,
        Property::MarginBottom,
        Property::MarginLeft,
        Property::PaddingTop,
        Property::PaddingRight,
        Property::PaddingBottom,
        Property::PaddingLeft,
        Property::BorderTopWidth,
        Property::BorderRightWidth,
        Property::BorderBottomWidth,
        Property::BorderLeftWidth,
    ];

    /// Offsets that anchor a box inside its container
    pub const OFFSETS: [Property; 4] = [
        Property::Left,
        Property::Top,
        Property::Right,
        Property::Bottom,
    ];

    pub const MARGINS: [Property; 4] = [
        Property::MarginTop,
        Property::MarginRight,
        Property::MarginBottom,
        Property::MarginLeft,
    ];

    /// CSS name of the property
    pub fn name(&self) -> &'static str {
        match self {
            Property::Position => "position",
            Property::Left => "left",
            Property::Top => "top",
            Property::Right => "right",
            Property::Bottom => "bottom",
            Property::Width => "width",
            Property::Height => "height",
            Property::MinWidth => "min-width",
            Property::MinHeight => "min-height",
            Property::MarginTop => "margin-top",
            Property::MarginRight => "margin-right",
            Property::MarginBottom => "margin-bottom",
            Property::MarginLeft => "margin-left",
            Property::PaddingTop => "padding-top",
            Property::PaddingRight => "padding-right",
            Property::PaddingBottom => "padding-bottom",
            Property::PaddingLeft => "padding-left",
            Property::BorderTopWidth => "border-top-width",
            Property::BorderRightWidth => "border-right-width",
            Property::BorderBottomWidth => "border-bottom-width",
            Property::BorderLeftWidth => "border-left-width",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a style key is not a box-model property
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style property '{0}'")]
pub struct UnknownProperty(pub String);

impl FromStr for Property {
    type Err = UnknownProperty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Property::ALL
            .iter()
            .copied()
            .find(|p| p.name() == key)
            .ok_or(UnknownProperty(s.to_string()))
    }
}

/// Parse a pixel length. Malformed, non-finite or keyword values read as `0`.
pub fn parse_px(value: &str) -> f64 {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    match number.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Format a pixel length the way the style sink writes it
pub fn format_px(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}px", value as i64)
    } else {
        format!("{}px", value)
    }
}

/// A box's style map
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    values: BTreeMap<Property, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a raw value
    pub fn with(mut self, property: Property, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Builder-style setter for a pixel value
    pub fn with_px(mut self, property: Property, value: f64) -> Self {
        self.set(property, format_px(value));
        self
    }

    pub fn set(&mut self, property: Property, value: impl Into<String>) {
        self.values.insert(property, value.into());
    }

    pub fn remove(&mut self, property: Property) -> Option<String> {
        self.values.remove(&property)
    }

    pub fn get(&self, property: Property) -> Option<&str> {
        self.values.get(&property).map(|s| s.as_str())
    }

    pub fn has(&self, property: Property) -> bool {
        self.values.contains_key(&property)
    }

    /// Pixel value of a property, `None` when unset
    pub fn px(&self, property: Property) -> Option<f64> {
        self.get(property).map(parse_px)
    }

    /// Pixel value of a property, `0` when unset or malformed
    pub fn px_or_zero(&self, property: Property) -> f64 {
        self.px(property).unwrap_or(0.0)
    }

    /// True when the value is a percentage, e.g. `width: 100%`
    pub fn is_percent(&self, property: Property) -> bool {
        self.get(property)
            .map(|v| v.trim().ends_with('%'))
            .unwrap_or(false)
    }

    /// True when `margin-top: auto` (footer pinned to the page bottom)
    pub fn is_auto(&self, property: Property) -> bool {
        self.get(property).map(|v| v.trim() == "auto").unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply a delta in place
    pub fn apply(&mut self, delta: &StyleDelta) {
        for (property, value) in delta.iter() {
            match value {
                StyleValue::Px(px) => self.set(property, format_px(*px)),
                StyleValue::Keyword(k) => self.set(property, k.clone()),
                StyleValue::Remove => {
                    self.remove(property);
                }
            }
        }
    }
}

/// A value written through the style sink
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Px(f64),
    Keyword(String),
    Remove,
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Px(v) => f.write_str(&format_px(*v)),
            StyleValue::Keyword(k) => f.write_str(k),
            StyleValue::Remove => f.write_str("<removed>"),
        }
    }
}

/// The engine's only output against a box: `{property: value}` in pixels
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleDelta {
    values: BTreeMap<Property, StyleValue>,
}

impl StyleDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn px(mut self, property: Property, value: f64) -> Self {
        self.set_px(property, value);
        self
    }

    pub fn keyword(mut self, property: Property, value: impl Into<String>) -> Self {
        self.values
            .insert(property, StyleValue::Keyword(value.into()));
        self
    }

    pub fn remove(mut self, property: Property) -> Self {
        self.values.insert(property, StyleValue::Remove);
        self
    }

    pub fn set_px(&mut self, property: Property, value: f64) {
        self.values.insert(property, StyleValue::Px(value));
    }

    pub fn get(&self, property: Property) -> Option<&StyleValue> {
        self.values.get(&property)
    }

    /// Pixel value written for a property, if any
    pub fn get_px(&self, property: Property) -> Option<f64> {
        match self.values.get(&property) {
            Some(StyleValue::Px(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &StyleValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Merge another delta, with `other` taking precedence
    pub fn merge(&mut self, other: StyleDelta) {
        self.values.extend(other.values);
    }

    /// `None` when nothing changed
    pub fn non_empty(self) -> Option<StyleDelta> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for StyleDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
