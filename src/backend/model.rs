//! Typed subset of the Google Slides presentation resource.
//!
//! Only the fields the compiler reads are modelled. Everything is
//! `#[serde(default)]` so a response that omits a field (the API drops
//! zero-valued numbers and empty lists) still decodes; absence is an
//! ordinary `None`, never a lookup failure.

use serde::{Deserialize, Serialize};

// ── Geometry ─────────────────────────────────────────────────────────────

/// Unit of a [`Dimension`] or [`AffineTransform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    /// English Metric Unit; 914 400 per inch, 12 700 per point.
    #[default]
    Emu,
    /// Typographic point.
    Pt,
    #[serde(other)]
    UnitUnspecified,
}

/// A magnitude in a single direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Dimension {
    pub fn emu(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Emu,
        }
    }

    pub fn pt(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Pt,
        }
    }

    /// Magnitude converted to EMU.
    pub fn to_emu(&self) -> f64 {
        match self.unit {
            Unit::Pt => self.magnitude * 12_700.0,
            Unit::Emu | Unit::UnitUnspecified => self.magnitude,
        }
    }
}

/// Width and height of a page or page element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
}

impl Size {
    pub fn emu(width: f64, height: f64) -> Self {
        Self {
            width: Dimension::emu(width),
            height: Dimension::emu(height),
        }
    }
}

/// Maps an element's intrinsic size onto the page.
///
/// Rendered width is `size.width * scale_x`; position is
/// `(translate_x, translate_y)` of the element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    #[serde(default)]
    pub scale_x: f64,
    #[serde(default)]
    pub scale_y: f64,
    #[serde(default)]
    pub shear_x: f64,
    #[serde(default)]
    pub shear_y: f64,
    #[serde(default)]
    pub translate_x: f64,
    #[serde(default)]
    pub translate_y: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::translate(0.0, 0.0)
    }
}

impl AffineTransform {
    /// Identity scale at the given EMU offset.
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            translate_x: x,
            translate_y: y,
            unit: Unit::Emu,
        }
    }
}

/// An RGB colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgbColor {
    #[serde(default)]
    pub red: f64,
    #[serde(default)]
    pub green: f64,
    #[serde(default)]
    pub blue: f64,
}

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor::new(1.0, 1.0, 1.0);

    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }
}

// ── Presentation resource ────────────────────────────────────────────────

/// A presentation as returned by `presentations.create` / `presentations.get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub presentation_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub page_size: Option<Size>,
    #[serde(default)]
    pub slides: Vec<Page>,
}

impl Presentation {
    /// Look up a slide by the object id it was created with.
    pub fn slide(&self, object_id: &str) -> Option<&Page> {
        self.slides.iter().find(|p| p.object_id == object_id)
    }
}

/// A slide or notes page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
    #[serde(default)]
    pub slide_properties: Option<SlideProperties>,
    #[serde(default)]
    pub notes_properties: Option<NotesProperties>,
}

impl Page {
    /// First shape on this page carrying one of the given placeholder types.
    pub fn placeholder(&self, kinds: &[PlaceholderType]) -> Option<&PageElement> {
        self.page_elements
            .iter()
            .find(|e| e.placeholder_type().is_some_and(|t| kinds.contains(&t)))
    }

    /// Object id of the speaker-notes shape, if the slide has a notes page.
    pub fn speaker_notes_id(&self) -> Option<&str> {
        let notes = self.slide_properties.as_ref()?.notes_page.as_deref()?;
        notes
            .notes_properties
            .as_ref()
            .and_then(|p| p.speaker_notes_object_id.as_deref())
            .or_else(|| {
                notes
                    .placeholder(&[PlaceholderType::Body])
                    .map(|e| e.object_id.as_str())
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideProperties {
    #[serde(default)]
    pub notes_page: Option<Box<Page>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesProperties {
    #[serde(default)]
    pub speaker_notes_object_id: Option<String>,
}

/// A positioned element on a page. Only shapes matter to the compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub transform: Option<AffineTransform>,
    #[serde(default)]
    pub shape: Option<Shape>,
}

impl PageElement {
    pub fn placeholder_type(&self) -> Option<PlaceholderType> {
        self.shape.as_ref()?.placeholder.as_ref().map(|p| p.kind)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default)]
    pub placeholder: Option<Placeholder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placeholder {
    #[serde(rename = "type", default)]
    pub kind: PlaceholderType,
}

/// Placeholder kinds the compiler cares about; everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceholderType {
    Title,
    CenteredTitle,
    Subtitle,
    Body,
    Object,
    #[default]
    #[serde(other)]
    Other,
}
