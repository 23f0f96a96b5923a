//! Typed shape of the UI description returned by the model.
//!
//! The handler returns the model's JSON value as-is; these types are only
//! used to check that the value has the expected shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiDescription {
    pub screen_name: String,
    pub layout: Layout,
    pub sections: Vec<Section>,
}

impl UiDescription {
    /// Check a parsed JSON value against the expected shape.
    pub fn conform(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        UiDescription::deserialize(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    SingleColumn,
    TwoColumn,
    ThreeColumn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementType,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ElementValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    /// Table cells; models emit strings, numbers or nulls here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<serde_json::Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<NavItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Heading,
    Subheading,
    Text,
    Input,
    Textarea,
    Select,
    Number,
    Button,
    Table,
    Icon,
    Image,
    Navbar,
}

impl ElementType {
    pub const ALL: [ElementType; 12] = [
        ElementType::Heading,
        ElementType::Subheading,
        ElementType::Text,
        ElementType::Input,
        ElementType::Textarea,
        ElementType::Select,
        ElementType::Number,
        ElementType::Button,
        ElementType::Table,
        ElementType::Icon,
        ElementType::Image,
        ElementType::Navbar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Heading => "heading",
            ElementType::Subheading => "subheading",
            ElementType::Text => "text",
            ElementType::Input => "input",
            ElementType::Textarea => "textarea",
            ElementType::Select => "select",
            ElementType::Number => "number",
            ElementType::Button => "button",
            ElementType::Table => "table",
            ElementType::Icon => "icon",
            ElementType::Image => "image",
            ElementType::Navbar => "navbar",
        }
    }
}

/// `value` is either text or a number; `null` maps to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<NavVariant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavVariant {
    Primary,
    Secondary,
}
