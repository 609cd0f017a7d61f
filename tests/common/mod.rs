//! In-memory collaborators for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use edgequake_slides::backend::model::{
    AffineTransform, NotesProperties, Page, PageElement, Placeholder, PlaceholderType,
    Presentation, Shape, Size, SlideProperties,
};
use edgequake_slides::backend::requests::{PredefinedLayout, Request};
use edgequake_slides::backend::{DocumentBackend, Permission};
use edgequake_slides::pipeline::research::{OutlineSource, ResearchedOutline};
use edgequake_slides::{BackendError, ImageFinder, Outline, ResearchError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

pub const PRESENTATION_ID: &str = "pres_123";
const DEFAULT_SLIDE: &str = "p";

/// Which backend call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Create,
    Skeleton,
    Content,
    Share,
}

#[derive(Default)]
struct State {
    slides: Vec<(String, PredefinedLayout)>,
    batches: Vec<Vec<Request>>,
    grants: Vec<Permission>,
    fetches: usize,
}

/// Slides backend that synthesises placeholders the way the real service
/// does for the two layouts the compiler uses.
///
/// * `TITLE`: `{id}_title` (CENTERED_TITLE), `{id}_subtitle` (SUBTITLE)
/// * `TITLE_AND_BODY`: `{id}_title` (TITLE), `{id}_body` (BODY, sized)
/// * every slide: a notes page whose speaker-notes shape is `{id}_notes`
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    omitted: HashSet<String>,
    fail_at: Option<FailAt>,
    pub page_size: Option<Size>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave `page_id` out of `get_presentation` results.
    pub fn omitting(mut self, page_id: &str) -> Self {
        self.omitted.insert(page_id.to_string());
        self
    }

    pub fn failing_at(mut self, at: FailAt) -> Self {
        self.fail_at = Some(at);
        self
    }

    pub fn batches(&self) -> Vec<Vec<Request>> {
        self.state.lock().unwrap().batches.clone()
    }

    /// The last submitted batch: the content batch on a successful run.
    pub fn content_batch(&self) -> Vec<Request> {
        self.batches().last().cloned().unwrap_or_default()
    }

    pub fn grants(&self) -> Vec<Permission> {
        self.state.lock().unwrap().grants.clone()
    }

    pub fn slide_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .slides
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn fail(&self, at: FailAt) -> Result<(), BackendError> {
        if self.fail_at == Some(at) {
            return Err(BackendError::Api {
                status: 500,
                message: format!("injected failure at {at:?}"),
            });
        }
        Ok(())
    }
}

fn shape(object_id: String, kind: PlaceholderType, size: Option<Size>) -> PageElement {
    PageElement {
        object_id,
        size,
        transform: size.map(|_| AffineTransform::translate(311_700.0, 1_152_475.0)),
        shape: Some(Shape {
            placeholder: Some(Placeholder { kind }),
        }),
    }
}

fn synthesise(id: &str, layout: PredefinedLayout) -> Page {
    let page_elements = match layout {
        PredefinedLayout::Title => vec![
            shape(format!("{id}_title"), PlaceholderType::CenteredTitle, None),
            shape(format!("{id}_subtitle"), PlaceholderType::Subtitle, None),
        ],
        PredefinedLayout::TitleAndBody => vec![
            shape(format!("{id}_title"), PlaceholderType::Title, None),
            shape(
                format!("{id}_body"),
                PlaceholderType::Body,
                Some(Size::emu(8_520_600.0, 3_416_400.0)),
            ),
        ],
    };
    let notes_page = Page {
        object_id: format!("{id}_notes_page"),
        page_elements: vec![shape(format!("{id}_notes"), PlaceholderType::Body, None)],
        slide_properties: None,
        notes_properties: Some(NotesProperties {
            speaker_notes_object_id: Some(format!("{id}_notes")),
        }),
    };
    Page {
        object_id: id.to_string(),
        page_elements,
        slide_properties: Some(SlideProperties {
            notes_page: Some(Box::new(notes_page)),
        }),
        notes_properties: None,
    }
}

#[async_trait]
impl DocumentBackend for FakeBackend {
    async fn create_presentation(&self, title: &str) -> Result<Presentation, BackendError> {
        self.fail(FailAt::Create)?;
        let mut state = self.state.lock().unwrap();
        state.slides = vec![(DEFAULT_SLIDE.to_string(), PredefinedLayout::Title)];
        Ok(Presentation {
            presentation_id: PRESENTATION_ID.to_string(),
            title: Some(title.to_string()),
            page_size: None,
            slides: vec![synthesise(DEFAULT_SLIDE, PredefinedLayout::Title)],
        })
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[Request],
    ) -> Result<(), BackendError> {
        assert_eq!(presentation_id, PRESENTATION_ID);
        let creates_slides = requests.iter().any(|r| matches!(r, Request::CreateSlide(_)));
        let is_cleanup = requests
            .iter()
            .all(|r| matches!(r, Request::DeleteObject(d) if d.object_id == DEFAULT_SLIDE));
        if creates_slides {
            self.fail(FailAt::Skeleton)?;
        } else if !is_cleanup {
            self.fail(FailAt::Content)?;
        }

        let mut state = self.state.lock().unwrap();
        for request in requests {
            match request {
                Request::CreateSlide(r) => state.slides.push((
                    r.object_id.clone(),
                    r.slide_layout_reference.predefined_layout,
                )),
                Request::DeleteObject(r) => state.slides.retain(|(id, _)| *id != r.object_id),
                _ => {}
            }
        }
        state.batches.push(requests.to_vec());
        Ok(())
    }

    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        let slides = state
            .slides
            .iter()
            .filter(|(id, _)| !self.omitted.contains(id))
            .map(|(id, layout)| synthesise(id, *layout))
            .collect();
        Ok(Presentation {
            presentation_id: presentation_id.to_string(),
            title: None,
            page_size: self.page_size,
            slides,
        })
    }

    async fn grant_permission(
        &self,
        _presentation_id: &str,
        permission: &Permission,
    ) -> Result<(), BackendError> {
        self.fail(FailAt::Share)?;
        self.state.lock().unwrap().grants.push(permission.clone());
        Ok(())
    }
}

/// Returns a fixed outline, failing with `failures` first (last one first).
pub struct FakeOutlineSource {
    outline: Outline,
    failures: Mutex<Vec<ResearchError>>,
    pub calls: AtomicU32,
}

impl FakeOutlineSource {
    pub fn new(outline: Outline) -> Self {
        Self {
            outline,
            failures: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing_first(self, failures: Vec<ResearchError>) -> Self {
        *self.failures.lock().unwrap() = failures;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutlineSource for FakeOutlineSource {
    async fn outline(
        &self,
        _topic: &str,
        _slide_count: usize,
    ) -> Result<ResearchedOutline, ResearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().unwrap().pop() {
            return Err(err);
        }
        Ok(self.outline.clone().into())
    }
}

/// Parses a canned model response the way the LLM source does.
pub struct JsonOutlineSource(pub String);

#[async_trait]
impl OutlineSource for JsonOutlineSource {
    async fn outline(
        &self,
        topic: &str,
        slide_count: usize,
    ) -> Result<ResearchedOutline, ResearchError> {
        let (outline, rejected) = Outline::from_json(&self.0, topic, Some(slide_count))?;
        Ok(ResearchedOutline {
            outline,
            rejected,
            retries: 0,
        })
    }
}

/// Image finder backed by a query → URL table; unknown queries find nothing.
#[derive(Default)]
pub struct FakeImages {
    urls: HashMap<String, String>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn with(mut self, query: &str, url: &str) -> Self {
        self.urls.insert(query.to_string(), url.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFinder for FakeImages {
    async fn find(&self, query: &str) -> Option<String> {
        self.queries.lock().unwrap().push(query.to_string());
        self.urls.get(query).cloned()
    }
}

/// Variant name of a request, for order assertions.
pub fn kind(request: &Request) -> &'static str {
    match request {
        Request::CreateSlide(_) => "createSlide",
        Request::DeleteObject(_) => "deleteObject",
        Request::InsertText(_) => "insertText",
        Request::UpdateTextStyle(_) => "updateTextStyle",
        Request::UpdatePageElementTransform(_) => "updatePageElementTransform",
        Request::CreateImage(_) => "createImage",
        Request::CreateTable(_) => "createTable",
        Request::UpdateTableCellProperties(_) => "updateTableCellProperties",
        Request::UpdatePageProperties(_) => "updatePageProperties",
    }
}

/// The page a request lands on: the placement page for created elements,
/// otherwise the object it names.
pub fn page_target(request: &Request) -> &str {
    match request {
        Request::CreateImage(r) => &r.element_properties.page_object_id,
        Request::CreateTable(r) => &r.element_properties.page_object_id,
        other => other.object_id(),
    }
}

/// Requests touching `page_id` itself or any element named after it.
pub fn touching<'a>(batch: &'a [Request], page_id: &str) -> Vec<&'a Request> {
    let element_prefix = format!("{page_id}_");
    batch
        .iter()
        .filter(|r| {
            page_target(r) == page_id
                || r.object_id() == page_id
                || r.object_id().starts_with(&element_prefix)
        })
        .collect()
}
