//! Layout planning: one slide in, its edit operations out.
//!
//! Everything here is pure. Placeholder ids come from the fetched
//! presentation, image URLs were resolved beforehand, and the output is a
//! [`BatchPlan`] whose categories the compiler merges across slides.
//!
//! ## Per-slide rules
//!
//! 1. Table slide: the body placeholder is deleted; the table replaces it.
//! 2. Content slide with bullets and an image: the body is rescaled to
//!    the left half of the page, the image fills the right.
//! 3. Title text, bold, in the theme's title colour.
//! 4. Bullets as `"• text"` lines in one insertion, then a size/colour style.
//! 5. Table: `(rows + 1) × columns`, white bold header text on the theme's
//!    header fill, body text in the theme's table colour.
//! 6. Speaker notes, when the slide has both notes and a notes shape.
//! 7. Image, flush right, when a URL was found.
//!
//! Missing placeholders, notes shapes, or image URLs remove the matching
//! piece and nothing else.

use crate::backend::model::{AffineTransform, Page, PlaceholderType, RgbColor, Size};
use crate::backend::requests::{PageElementProperties, Request, TableCellLocation, TextStyle};
use crate::config::LayoutConfig;
use crate::outline::{Slide, SlideContent, Table};
use crate::theme::Theme;

const TITLE_KINDS: &[PlaceholderType] = &[PlaceholderType::Title, PlaceholderType::CenteredTitle];
const BODY_KINDS: &[PlaceholderType] = &[PlaceholderType::Body, PlaceholderType::Object];

/// Edit operations grouped by the phase of the final batch they belong to.
///
/// [`BatchPlan::into_requests`] emits them as
/// background → delete → resize → text → table → image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPlan {
    pub background: Vec<Request>,
    pub delete: Vec<Request>,
    pub resize: Vec<Request>,
    pub text: Vec<Request>,
    pub table: Vec<Request>,
    pub image: Vec<Request>,
}

impl BatchPlan {
    /// Append `other`'s operations category by category.
    pub fn absorb(&mut self, other: BatchPlan) {
        self.background.extend(other.background);
        self.delete.extend(other.delete);
        self.resize.extend(other.resize);
        self.text.extend(other.text);
        self.table.extend(other.table);
        self.image.extend(other.image);
    }

    pub fn len(&self) -> usize {
        self.background.len()
            + self.delete.len()
            + self.resize.len()
            + self.text.len()
            + self.table.len()
            + self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_requests(self) -> Vec<Request> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.background);
        out.extend(self.delete);
        out.extend(self.resize);
        out.extend(self.text);
        out.extend(self.table);
        out.extend(self.image);
        out
    }
}

/// Page dimensions in EMU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    /// The presentation's own page size, or the configured fallback.
    pub fn resolve(page_size: Option<&Size>, layout: &LayoutConfig) -> Self {
        match page_size {
            Some(size) if size.width.to_emu() > 0.0 && size.height.to_emu() > 0.0 => Self {
                width: size.width.to_emu(),
                height: size.height.to_emu(),
            },
            _ => Self {
                width: layout.slide_width,
                height: layout.slide_height,
            },
        }
    }
}

/// The body placeholder with the geometry needed to rescale it.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPlaceholder {
    pub object_id: String,
    pub size: Option<Size>,
    pub transform: Option<AffineTransform>,
}

/// Backend-assigned shape ids on one slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<BodyPlaceholder>,
    pub notes: Option<String>,
}

impl Placeholders {
    pub fn from_page(page: &Page) -> Self {
        Self {
            title: page.placeholder(TITLE_KINDS).map(|e| e.object_id.clone()),
            subtitle: page
                .placeholder(&[PlaceholderType::Subtitle])
                .map(|e| e.object_id.clone()),
            body: page.placeholder(BODY_KINDS).map(|e| BodyPlaceholder {
                object_id: e.object_id.clone(),
                size: e.size,
                transform: e.transform,
            }),
            notes: page.speaker_notes_id().map(str::to_string),
        }
    }
}

/// Everything the planner needs to know about where a slide lives.
#[derive(Debug, Clone)]
pub struct SlideContext<'a> {
    /// 1-based position in the outline; seeds per-slide object ids.
    pub index: usize,
    pub page_id: &'a str,
    pub placeholders: &'a Placeholders,
    pub image_url: Option<&'a str>,
    pub page: PageGeometry,
}

pub fn image_object_id(index: usize) -> String {
    format!("image_{index}")
}

pub fn table_object_id(index: usize) -> String {
    format!("table_{index}")
}

/// Plan one content or table slide.
pub fn plan_slide(
    slide: &Slide,
    ctx: &SlideContext<'_>,
    theme: &Theme,
    layout: &LayoutConfig,
) -> BatchPlan {
    let mut plan = BatchPlan::default();

    if let Some(ref title_id) = ctx.placeholders.title {
        push_styled_text(
            &mut plan.text,
            title_id,
            &slide.title,
            TextStyle::default()
                .bold()
                .size_pt(layout.slide_title_pt)
                .color(theme.title_color),
        );
    }

    match &slide.content {
        SlideContent::Bullets { bullets, .. } => {
            let body_text = bullet_text(bullets);
            if let (Some(body), false) = (&ctx.placeholders.body, body_text.is_empty()) {
                if ctx.image_url.is_some() {
                    if let Some(transform) = half_width_transform(body, ctx.page.width) {
                        plan.resize.push(Request::set_transform(&body.object_id, transform));
                    }
                }
                push_styled_text(
                    &mut plan.text,
                    &body.object_id,
                    &body_text,
                    TextStyle::default()
                        .size_pt(layout.body_pt)
                        .color(theme.body_color),
                );
            }
            if let Some(url) = ctx.image_url {
                plan.image.push(Request::create_image(
                    image_object_id(ctx.index),
                    url,
                    PageElementProperties::placed(
                        ctx.page_id,
                        Size::emu(layout.image_width, layout.image_height),
                        AffineTransform::translate(
                            ctx.page.width - layout.image_width,
                            layout.image_top,
                        ),
                    ),
                ));
            }
        }
        SlideContent::Table(table) => {
            if let Some(ref body) = ctx.placeholders.body {
                plan.delete.push(Request::delete_object(&body.object_id));
            }
            plan.table = plan_table(table, ctx, theme, layout);
        }
    }

    if let (Some(notes), Some(notes_id)) = (&slide.notes, &ctx.placeholders.notes) {
        if !notes.trim().is_empty() {
            plan.text.push(Request::insert_text(notes_id, notes.as_str()));
        }
    }

    plan
}

/// Create the table and fill every cell.
///
/// Empty cells get no text operations; header cells are filled regardless.
pub fn plan_table(
    table: &Table,
    ctx: &SlideContext<'_>,
    theme: &Theme,
    layout: &LayoutConfig,
) -> Vec<Request> {
    let table_id = table_object_id(ctx.index);
    let rows = table.row_count();
    let columns = table.column_count();
    let mut ops = Vec::with_capacity(1 + columns * 3 + (rows - 1) * columns * 2);

    ops.push(Request::create_table(
        &table_id,
        rows,
        columns,
        PageElementProperties::placed(
            ctx.page_id,
            Size::emu(
                ctx.page.width - 2.0 * layout.table_left,
                rows as f64 * layout.table_row_height,
            ),
            AffineTransform::translate(layout.table_left, layout.table_top),
        ),
    ));

    let header_style = TextStyle::default()
        .bold()
        .size_pt(layout.table_header_pt)
        .color(RgbColor::WHITE);
    for (col, header) in table.headers().iter().enumerate() {
        let cell = TableCellLocation::new(0, col);
        push_cell_text(&mut ops, &table_id, cell, header, &header_style);
        ops.push(Request::fill_cell(&table_id, cell, theme.table_header_color));
    }

    let body_style = TextStyle::default()
        .size_pt(layout.table_body_pt)
        .color(theme.table_body_text_color);
    for (r, row) in table.rows().iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let cell = TableCellLocation::new(r + 1, col);
            push_cell_text(&mut ops, &table_id, cell, value, &body_style);
        }
    }

    ops
}

/// The opening slide of a deck.
#[derive(Debug, Clone)]
pub struct TitleSlide<'a> {
    pub topic: &'a str,
    pub subtitle: &'a str,
    pub page_id: &'a str,
    pub placeholders: &'a Placeholders,
    pub hero_image_url: Option<&'a str>,
}

/// Plan the opening slide: deck title, subtitle, optional hero image.
pub fn plan_title_slide(
    slide: &TitleSlide<'_>,
    page: PageGeometry,
    theme: &Theme,
    layout: &LayoutConfig,
) -> BatchPlan {
    let TitleSlide {
        topic,
        subtitle,
        page_id,
        placeholders,
        hero_image_url,
    } = *slide;
    let mut plan = BatchPlan::default();

    if let Some(ref title_id) = placeholders.title {
        push_styled_text(
            &mut plan.text,
            title_id,
            topic,
            TextStyle::default()
                .bold()
                .size_pt(layout.deck_title_pt)
                .color(theme.title_color),
        );
    }
    if let Some(ref subtitle_id) = placeholders.subtitle {
        push_styled_text(
            &mut plan.text,
            subtitle_id,
            subtitle,
            TextStyle::default()
                .size_pt(layout.subtitle_pt)
                .color(theme.body_color),
        );
    }
    if let Some(url) = hero_image_url {
        plan.image.push(Request::create_image(
            "hero_image",
            url,
            PageElementProperties::placed(
                page_id,
                Size::emu(layout.hero_width, layout.hero_height),
                AffineTransform::translate(
                    (page.width - layout.hero_width) / 2.0,
                    page.height * layout.hero_top_ratio,
                ),
            ),
        ));
    }

    plan
}

/// `"• a\n• b"`, skipping blank bullets.
pub fn bullet_text(bullets: &[String]) -> String {
    bullets
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(|b| format!("• {b}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rescale `body` so its rendered width is half the page.
///
/// Vertical scale, shear and translation are kept. `None` when the shape
/// reports no usable width.
pub fn half_width_transform(body: &BodyPlaceholder, page_width: f64) -> Option<AffineTransform> {
    let current = body.size?.width.to_emu();
    if !(current.is_finite() && current > 0.0) {
        return None;
    }
    let mut transform = body.transform.unwrap_or_default();
    transform.scale_x = (page_width / 2.0) / current;
    Some(transform)
}

fn push_styled_text(ops: &mut Vec<Request>, object_id: &str, text: &str, style: TextStyle) {
    if text.trim().is_empty() {
        return;
    }
    ops.push(Request::insert_text(object_id, text));
    ops.push(Request::style_text(object_id, style));
}

fn push_cell_text(
    ops: &mut Vec<Request>,
    table_id: &str,
    cell: TableCellLocation,
    text: &str,
    style: &TextStyle,
) {
    if text.trim().is_empty() {
        return;
    }
    ops.push(Request::insert_cell_text(table_id, cell, text));
    ops.push(Request::style_cell_text(table_id, cell, style.clone()));
}
