//! Drawable styling.
//!
//! A style is a set of optional overrides; unset fields fall through to the
//! style underneath when merged. Renderers resolve the final style as
//! `default ⊕ record override ⊕ call override`.

use serde::{Deserialize, Serialize};

/// Styling passed to the map surface when creating a drawable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Stroke color (CSS color string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stroke width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Stroke opacity, 0..=1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Fill color (CSS color string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Fill opacity, 0..=1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    /// Stroke dash pattern, e.g. `"5, 5"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
    /// Marker radius in pixels (points only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl Style {
    /// Create a new empty style (every field falls through).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stroke-only style.
    pub fn stroke(color: impl Into<String>, weight: f64) -> Self {
        Self::new().with_color(color).with_weight(weight)
    }

    /// Create a style with both fill and stroke.
    pub fn fill_and_stroke(fill: impl Into<String>, stroke: impl Into<String>, weight: f64) -> Self {
        Self::stroke(stroke, weight).with_fill_color(fill)
    }

    /// Set the stroke color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the stroke width.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the stroke opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity.clamp(0.0, 1.0));
        self
    }

    /// Set the fill color.
    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    /// Set the fill opacity.
    pub fn with_fill_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = Some(opacity.clamp(0.0, 1.0));
        self
    }

    /// Set the dash pattern.
    pub fn with_dash_array(mut self, dash: impl Into<String>) -> Self {
        self.dash_array = Some(dash.into());
        self
    }

    /// Set the marker radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// This style with every field set in `overrides` replaced.
    pub fn merged(&self, overrides: &Style) -> Style {
        Style {
            color: overrides.color.clone().or_else(|| self.color.clone()),
            weight: overrides.weight.or(self.weight),
            opacity: overrides.opacity.or(self.opacity),
            fill_color: overrides.fill_color.clone().or_else(|| self.fill_color.clone()),
            fill_opacity: overrides.fill_opacity.or(self.fill_opacity),
            dash_array: overrides.dash_array.clone().or_else(|| self.dash_array.clone()),
            radius: overrides.radius.or(self.radius),
        }
    }

    /// Check if this style has a visible fill.
    pub fn has_fill(&self) -> bool {
        self.fill_color.is_some() && self.fill_opacity.is_none_or(|o| o > 0.0)
    }

    /// Check if this style has a visible stroke.
    pub fn has_stroke(&self) -> bool {
        self.color.is_some()
            && self.weight.is_none_or(|w| w > 0.0)
            && self.opacity.is_none_or(|o| o > 0.0)
    }

    /// Check if nothing is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }
}

/// Default styles per geometry kind.
pub mod presets {
    use super::*;

    /// Blue marker.
    pub fn point() -> Style {
        Style::fill_and_stroke("#3388ff", "#ffffff", 2.0)
            .with_fill_opacity(0.9)
            .with_radius(6.0)
    }

    /// Blue 3px line.
    pub fn line() -> Style {
        Style::stroke("#3388ff", 3.0).with_opacity(0.8)
    }

    /// Green outline with translucent fill.
    pub fn polygon() -> Style {
        Style::fill_and_stroke("#2ecc71", "#27ae60", 2.0)
            .with_opacity(0.8)
            .with_fill_opacity(0.3)
    }

    /// Orange outline with translucent fill.
    pub fn circle() -> Style {
        Style::fill_and_stroke("#f39c12", "#e67e22", 2.0)
            .with_opacity(0.8)
            .with_fill_opacity(0.2)
    }

    /// Dashed purple for free-hand drawings.
    pub fn drawing() -> Style {
        Style::fill_and_stroke("#9b59b6", "#8e44ad", 3.0)
            .with_opacity(0.9)
            .with_fill_opacity(0.25)
            .with_dash_array("6, 4")
    }

    /// Red highlight used for selection.
    pub fn highlight() -> Style {
        Style::stroke("#e74c3c", 4.0).with_opacity(1.0)
    }
}
