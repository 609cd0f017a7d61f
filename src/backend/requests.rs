//! Edit operations submitted through `presentations.batchUpdate`.
//!
//! Each [`Request`] variant serialises to the externally-tagged object the
//! Slides API expects, e.g. `{"insertText": {"objectId": "…", "text": "…"}}`.
//! Every request that carries a partial style also carries the matching
//! `fields` mask, computed from whichever optional fields are set.

use super::model::{AffineTransform, Dimension, RgbColor, Size};
use serde::Serialize;

/// One operation in a batch update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    CreateSlide(CreateSlideRequest),
    DeleteObject(DeleteObjectRequest),
    InsertText(InsertTextRequest),
    UpdateTextStyle(UpdateTextStyleRequest),
    UpdatePageElementTransform(UpdatePageElementTransformRequest),
    CreateImage(CreateImageRequest),
    CreateTable(CreateTableRequest),
    UpdateTableCellProperties(UpdateTableCellPropertiesRequest),
    UpdatePageProperties(UpdatePagePropertiesRequest),
}

impl Request {
    /// The object this operation creates or targets.
    pub fn object_id(&self) -> &str {
        match self {
            Request::CreateSlide(r) => &r.object_id,
            Request::DeleteObject(r) => &r.object_id,
            Request::InsertText(r) => &r.object_id,
            Request::UpdateTextStyle(r) => &r.object_id,
            Request::UpdatePageElementTransform(r) => &r.object_id,
            Request::CreateImage(r) => &r.object_id,
            Request::CreateTable(r) => &r.object_id,
            Request::UpdateTableCellProperties(r) => &r.object_id,
            Request::UpdatePageProperties(r) => &r.object_id,
        }
    }

    // ── Constructors ─────────────────────────────────────────────────────

    pub fn create_slide(object_id: impl Into<String>, layout: PredefinedLayout) -> Self {
        Request::CreateSlide(CreateSlideRequest {
            object_id: object_id.into(),
            slide_layout_reference: LayoutReference {
                predefined_layout: layout,
            },
        })
    }

    pub fn delete_object(object_id: impl Into<String>) -> Self {
        Request::DeleteObject(DeleteObjectRequest {
            object_id: object_id.into(),
        })
    }

    pub fn insert_text(object_id: impl Into<String>, text: impl Into<String>) -> Self {
        Request::InsertText(InsertTextRequest {
            object_id: object_id.into(),
            cell_location: None,
            text: text.into(),
        })
    }

    pub fn insert_cell_text(
        table_id: impl Into<String>,
        cell: TableCellLocation,
        text: impl Into<String>,
    ) -> Self {
        Request::InsertText(InsertTextRequest {
            object_id: table_id.into(),
            cell_location: Some(cell),
            text: text.into(),
        })
    }

    pub fn style_text(object_id: impl Into<String>, style: TextStyle) -> Self {
        Request::UpdateTextStyle(UpdateTextStyleRequest {
            object_id: object_id.into(),
            cell_location: None,
            fields: style.fields(),
            style,
            text_range: TextRange::all(),
        })
    }

    pub fn style_cell_text(
        table_id: impl Into<String>,
        cell: TableCellLocation,
        style: TextStyle,
    ) -> Self {
        Request::UpdateTextStyle(UpdateTextStyleRequest {
            object_id: table_id.into(),
            cell_location: Some(cell),
            fields: style.fields(),
            style,
            text_range: TextRange::all(),
        })
    }

    pub fn set_transform(object_id: impl Into<String>, transform: AffineTransform) -> Self {
        Request::UpdatePageElementTransform(UpdatePageElementTransformRequest {
            object_id: object_id.into(),
            transform,
            apply_mode: ApplyMode::Absolute,
        })
    }

    pub fn create_image(
        object_id: impl Into<String>,
        url: impl Into<String>,
        element_properties: PageElementProperties,
    ) -> Self {
        Request::CreateImage(CreateImageRequest {
            object_id: object_id.into(),
            url: url.into(),
            element_properties,
        })
    }

    pub fn create_table(
        object_id: impl Into<String>,
        rows: usize,
        columns: usize,
        element_properties: PageElementProperties,
    ) -> Self {
        Request::CreateTable(CreateTableRequest {
            object_id: object_id.into(),
            element_properties,
            rows,
            columns,
        })
    }

    pub fn fill_cell(
        table_id: impl Into<String>,
        cell: TableCellLocation,
        color: RgbColor,
    ) -> Self {
        Request::UpdateTableCellProperties(UpdateTableCellPropertiesRequest {
            object_id: table_id.into(),
            table_range: TableRange {
                location: cell,
                row_span: 1,
                column_span: 1,
            },
            table_cell_properties: TableCellProperties {
                table_cell_background_fill: TableCellBackgroundFill {
                    solid_fill: SolidFill::rgb(color),
                },
            },
            fields: "tableCellBackgroundFill.solidFill.color".to_string(),
        })
    }

    pub fn fill_page(page_id: impl Into<String>, color: RgbColor) -> Self {
        Request::UpdatePageProperties(UpdatePagePropertiesRequest {
            object_id: page_id.into(),
            page_properties: PageProperties {
                page_background_fill: PageBackgroundFill {
                    solid_fill: SolidFill::rgb(color),
                },
            },
            fields: "pageBackgroundFill.solidFill.color".to_string(),
        })
    }
}

// ── Request bodies ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideRequest {
    pub object_id: String,
    pub slide_layout_reference: LayoutReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    pub predefined_layout: PredefinedLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredefinedLayout {
    Title,
    TitleAndBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectRequest {
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyleRequest {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub style: TextStyle,
    pub text_range: TextRange,
    pub fields: String,
}

/// Partial text style; unset fields are left untouched by the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<OptionalColor>,
}

impl TextStyle {
    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    pub fn size_pt(mut self, pt: f64) -> Self {
        self.font_size = Some(Dimension::pt(pt));
        self
    }

    pub fn color(mut self, color: RgbColor) -> Self {
        self.foreground_color = Some(OptionalColor {
            opaque_color: OpaqueColor { rgb_color: color },
        });
        self
    }

    /// Field mask naming exactly the fields that are set.
    pub fn fields(&self) -> String {
        let mut fields = Vec::with_capacity(3);
        if self.bold.is_some() {
            fields.push("bold");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        if self.foreground_color.is_some() {
            fields.push("foregroundColor");
        }
        fields.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionalColor {
    pub opaque_color: OpaqueColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaqueColor {
    pub rgb_color: RgbColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl TextRange {
    pub fn all() -> Self {
        Self { kind: "ALL" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    pub row_index: usize,
    pub column_index: usize,
}

impl TableCellLocation {
    pub fn new(row_index: usize, column_index: usize) -> Self {
        Self {
            row_index,
            column_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageElementTransformRequest {
    pub object_id: String,
    pub transform: AffineTransform,
    pub apply_mode: ApplyMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyMode {
    Absolute,
}

/// Where a new element goes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElementProperties {
    pub page_object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<AffineTransform>,
}

impl PageElementProperties {
    pub fn placed(
        page_object_id: impl Into<String>,
        size: Size,
        transform: AffineTransform,
    ) -> Self {
        Self {
            page_object_id: page_object_id.into(),
            size: Some(size),
            transform: Some(transform),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub object_id: String,
    pub url: String,
    pub element_properties: PageElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub object_id: String,
    pub element_properties: PageElementProperties,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTableCellPropertiesRequest {
    pub object_id: String,
    pub table_range: TableRange,
    pub table_cell_properties: TableCellProperties,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRange {
    pub location: TableCellLocation,
    pub row_span: usize,
    pub column_span: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellProperties {
    pub table_cell_background_fill: TableCellBackgroundFill,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellBackgroundFill {
    pub solid_fill: SolidFill,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolidFill {
    pub color: OpaqueColor,
}

impl SolidFill {
    fn rgb(color: RgbColor) -> Self {
        Self {
            color: OpaqueColor { rgb_color: color },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePagePropertiesRequest {
    pub object_id: String,
    pub page_properties: PageProperties,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProperties {
    pub page_background_fill: PageBackgroundFill,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBackgroundFill {
    pub solid_fill: SolidFill,
}
