use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_BACKGROUND: &str = "FFFFFF";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub slides: Vec<Slide>,
    pub template: Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub background: Background,
    pub background_elements: Vec<Element>,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    Color { value: String },
    Image { file: String },
}

impl Default for Background {
    fn default() -> Self {
        Background::Color {
            value: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAttributes {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font: String,
    pub color: String,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            size: 18.0,
            bold: false,
            italic: false,
            underline: false,
            font: "Arial".to_string(),
            color: "000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub attributes: TextAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub content: String,
    pub attributes: TextAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Line width in pixels (EMU / 9525).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub content: Vec<Paragraph>,
    pub position: Position,
    pub shape_background: Option<String>,
    pub z_order: i64,
    pub is_header: bool,
    pub is_background: bool,
    pub is_page_number: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub shape_type: String,
    pub position: Position,
    pub style: ShapeStyle,
    pub z_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub file: String,
    pub position: Position,
    pub z_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableElement {
    pub position: Position,
    pub rows: Vec<Vec<TableCell>>,
    pub z_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartElement {
    pub chart_file: String,
    pub position: Position,
    pub z_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Shape(ShapeElement),
    Image(ImageElement),
    Table(TableElement),
    Chart(ChartElement),
}

impl Element {
    pub fn z_order(&self) -> i64 {
        match self {
            Element::Text(e) => e.z_order,
            Element::Shape(e) => e.z_order,
            Element::Image(e) => e.z_order,
            Element::Table(e) => e.z_order,
            Element::Chart(e) => e.z_order,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            Element::Text(e) => &e.position,
            Element::Shape(e) => &e.position,
            Element::Image(e) => &e.position,
            Element::Table(e) => &e.position,
            Element::Chart(e) => &e.position,
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub placeholders: Vec<Placeholder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub colors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub layouts: Vec<Layout>,
    pub theme: Theme,
}
