//! Quote routes: `/quote-selection`, `/quick-estimate`, `/accurate-quote`.
//!
//! Each POST is one form "mount": values are rebuilt from the request, every
//! validator runs, and the side effect only happens once the error map is
//! empty. The accurate quote keeps its section list and draft state in the
//! page itself, so the list survives between requests as a hidden JSON field.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Form as FormBody, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;

use scaffy_core::action::{ActionOptions, AsyncAction};
use scaffy_core::form::{ErrorMap, Form};
use scaffy_core::leads::LeadReceipt;
use scaffy_core::notice::{Notice, NoticeBuffer};
use scaffy_core::quote::{
    BoardWidth, JobType, Section, SectionDraft, SectionList, fields, section_fields,
    validate_accurate_quote, validate_quick_estimate,
};

use super::page::{self, Field, escape_html};
use crate::error::PageError;
use crate::state::AppState;

/// Build the quote router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quote-selection", get(quote_selection))
        .route(
            "/quick-estimate",
            get(quick_estimate_page).post(submit_quick_estimate),
        )
        .route(
            "/accurate-quote",
            get(accurate_quote_page).post(submit_accurate_quote),
        )
}

const NAME_FIELD: Field<'static> = Field {
    name: fields::NAME,
    label: "Your Name",
    kind: "text",
    placeholder: "Joe Bloggs",
};

const PHONE_FIELD: Field<'static> = Field {
    name: fields::PHONE,
    label: "Phone Number",
    kind: "tel",
    placeholder: "07700 900000",
};

fn status_for(errors: &ErrorMap) -> StatusCode {
    if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

fn receipt_line(receipt: Option<&LeadReceipt>) -> String {
    receipt.map_or_else(String::new, |r| {
        format!(
            r#"<p class="mode">Reference {}</p>"#,
            escape_html(&r.short_reference())
        )
    })
}

// ── Quote selection ──────────────────────────────────────────────────

async fn quote_selection(State(state): State<Arc<AppState>>) -> Html<String> {
    let content = format!(
        "{heading}{body}",
        heading = page::heading("GET A PRICE", "Quote Builder", "/"),
        body = SELECTION_BODY,
    );
    Html(page::layout(&state.config.business_name, "Get a Price", &content))
}

const SELECTION_BODY: &str = r#"<h2>How detailed do you need to be?</h2>
<p class="kicker">Choose the best option for your job.</p>
<div style="margin-top:28px">
  <a class="card" href="/quick-estimate" style="display:block"><h3>QUICK ESTIMATE</h3><p>Rough price based on a description. Best for simple jobs.</p></a>
  <a class="card" href="/accurate-quote" style="display:block"><h3>ACCURATE QUOTE</h3><p>Detailed price based on specific measurements per section.</p></a>
</div>"#;

// ── Quick estimate ───────────────────────────────────────────────────

const QUICK_FIELDS: &[&str] = &[fields::NAME, fields::PHONE, fields::JOB_TYPE, fields::DESCRIPTION];

/// Raw quick estimate form body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuickEstimateForm {
    pub name: String,
    pub phone: String,
    pub job_type: String,
    pub description: String,
}

impl QuickEstimateForm {
    fn into_form(self) -> Form {
        let mut form = Form::new(QUICK_FIELDS);
        form.values.set(fields::NAME, self.name);
        form.values.set(fields::PHONE, self.phone);
        form.values.set(fields::JOB_TYPE, self.job_type);
        form.values.set(fields::DESCRIPTION, self.description);
        form
    }
}

async fn quick_estimate_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_quick_estimate(
        &state,
        &Form::new(QUICK_FIELDS),
        &[],
        None,
    ))
}

async fn submit_quick_estimate(
    State(state): State<Arc<AppState>>,
    FormBody(input): FormBody<QuickEstimateForm>,
) -> Response {
    let mut form = input.into_form();
    let notices = NoticeBuffer::new();
    let mut receipt = None;

    match validate_quick_estimate(&form.values) {
        Err(errors) => {
            tracing::debug!(invalid = errors.len(), "quick estimate rejected");
            form.accept(errors);
        }
        Ok(request) => {
            form.accept(ErrorMap::new());
            let action = AsyncAction::new(
                Arc::new(notices.clone()),
                ActionOptions::default().success_notice(
                    "Estimate requested",
                    "Thanks! We'll be in touch today with a rough price.",
                ),
            );
            receipt = action
                .execute(|| state.leads.submit_estimate(&request))
                .await;
            if receipt.is_some() {
                form.reset();
            }
        }
    }

    let status = status_for(&form.errors);
    let html = render_quick_estimate(&state, &form, &notices.drain(), receipt.as_ref());
    (status, Html(html)).into_response()
}

fn render_quick_estimate(
    state: &AppState,
    form: &Form,
    notices: &[Notice],
    receipt: Option<&LeadReceipt>,
) -> String {
    let job_options: Vec<(&str, &str)> = JobType::ALL
        .iter()
        .map(|j| (j.as_str(), j.label()))
        .collect();

    let content = format!(
        r#"{heading}<span class="mode">Quick Estimate Mode</span>{notices}{receipt}
<form method="post" action="/quick-estimate" novalidate data-submit-once>
{name}{phone}{job}{description}
<div class="submit-bar"><button type="submit" class="btn btn-primary">GET ESTIMATE</button></div>
</form>"#,
        heading = page::heading("GET A PRICE", "Quote Builder", "/quote-selection"),
        notices = page::notices(notices),
        receipt = receipt_line(receipt),
        name = page::input(NAME_FIELD, form.value(fields::NAME), form.error(fields::NAME)),
        phone = page::input(PHONE_FIELD, form.value(fields::PHONE), form.error(fields::PHONE)),
        job = page::choices(
            fields::JOB_TYPE,
            "Job Type",
            &job_options,
            form.value(fields::JOB_TYPE),
            form.error(fields::JOB_TYPE),
        ),
        description = page::textarea(
            Field {
                name: fields::DESCRIPTION,
                label: "Description",
                kind: "text",
                placeholder: "Roughly what do you need? e.g. Front of house for painting, 2 lifts...",
            },
            form.value(fields::DESCRIPTION),
            form.error(fields::DESCRIPTION),
        ),
    );
    page::layout(&state.config.business_name, "Quick Estimate", &content)
}

// ── Accurate quote ───────────────────────────────────────────────────

const DETAIL_FIELDS: &[&str] = &[fields::NAME, fields::PHONE];

/// Raw accurate quote form body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccurateQuoteForm {
    pub action: String,
    pub name: String,
    pub phone: String,
    /// JSON array of sections added so far.
    pub sections: String,
    pub section_name: String,
    pub height: String,
    pub length: String,
    pub board_width: String,
}

/// What the visitor pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteAction {
    OpenSection,
    SaveSection,
    CancelSection,
    Submit,
}

impl QuoteAction {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "open_section" => Some(Self::OpenSection),
            "save_section" => Some(Self::SaveSection),
            "cancel_section" => Some(Self::CancelSection),
            "submit" => Some(Self::Submit),
            _ => None,
        }
    }
}

/// Everything the accurate quote page shows.
#[derive(Debug)]
struct AccurateQuoteView {
    details: Form,
    sections: SectionList,
    draft: SectionDraft,
    draft_errors: ErrorMap,
    section_open: bool,
    notices: Vec<Notice>,
    receipt: Option<LeadReceipt>,
}

impl AccurateQuoteView {
    fn empty() -> Self {
        Self {
            details: Form::new(DETAIL_FIELDS),
            sections: SectionList::new(),
            draft: SectionDraft::default(),
            draft_errors: ErrorMap::new(),
            section_open: false,
            notices: Vec::new(),
            receipt: None,
        }
    }

    fn is_valid(&self) -> bool {
        self.details.errors.is_empty() && self.draft_errors.is_empty()
    }
}

fn parse_sections(raw: &str) -> Result<SectionList, PageError> {
    if raw.trim().is_empty() {
        return Ok(SectionList::new());
    }
    let sections = serde_json::from_str::<Vec<Section>>(raw).map_err(|e| {
        tracing::warn!(error = %e, "unreadable section list");
        PageError::BadRequest(
            "The section list could not be read. Please start your quote again.".to_owned(),
        )
    })?;
    SectionList::from_sections(sections).map_err(|errors| {
        tracing::warn!(count = errors.len(), "rejected section list");
        PageError::BadRequest(
            errors
                .get(fields::SECTIONS)
                .unwrap_or("The section list is invalid.")
                .to_owned(),
        )
    })
}

async fn accurate_quote_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    render_accurate_quote(&state, &AccurateQuoteView::empty()).map(Html)
}

async fn submit_accurate_quote(
    State(state): State<Arc<AppState>>,
    FormBody(input): FormBody<AccurateQuoteForm>,
) -> Result<Response, PageError> {
    let Some(action) = QuoteAction::parse(&input.action) else {
        return Err(PageError::BadRequest(format!(
            "Unknown quote action '{}'",
            input.action
        )));
    };

    let mut view = AccurateQuoteView::empty();
    view.sections = parse_sections(&input.sections)?;
    view.details.values.set(fields::NAME, input.name);
    view.details.values.set(fields::PHONE, input.phone);

    match action {
        QuoteAction::OpenSection => {
            view.section_open = true;
        }
        QuoteAction::CancelSection => {
            view.section_open = false;
        }
        QuoteAction::SaveSection => {
            let draft = SectionDraft {
                name: input.section_name,
                height: input.height,
                length: input.length,
                board_width: input.board_width,
            };
            match view.sections.add(&draft) {
                Ok(section) => {
                    tracing::debug!(section_id = section.id, "section added");
                }
                Err(errors) => {
                    view.section_open = true;
                    view.draft = draft;
                    view.draft_errors = errors;
                }
            }
        }
        QuoteAction::Submit => submit_quote(&state, &mut view).await,
    }

    let status = if view.is_valid() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let html = render_accurate_quote(&state, &view)?;
    Ok((status, Html(html)).into_response())
}

async fn submit_quote(state: &AppState, view: &mut AccurateQuoteView) {
    let request = match validate_accurate_quote(&view.details.values, &view.sections) {
        Ok(request) => request,
        Err(errors) => {
            view.details.accept(errors);
            return;
        }
    };

    let notices = NoticeBuffer::new();
    let action = AsyncAction::new(
        Arc::new(notices.clone()),
        ActionOptions::default().success_notice(
            "Quote requested",
            "Thanks! We'll price up every section and get back to you.",
        ),
    );
    let receipt = action
        .execute(|| state.leads.submit_quote(&request))
        .await;

    if receipt.is_some() {
        view.details.reset();
        view.sections = SectionList::new();
    }
    view.receipt = receipt;
    view.notices = notices.drain();
}

fn render_accurate_quote(state: &AppState, view: &AccurateQuoteView) -> Result<String, PageError> {
    let sections_json = serde_json::to_string(view.sections.as_slice())
        .map_err(|e| PageError::Internal(format!("section list serialization: {e}")))?;

    let mut parts = format!(
        r#"<h2>2. SCAFFOLD PARTS</h2><p class="kicker">{count} parts added</p>"#,
        count = view.sections.len(),
    );
    for section in view.sections.as_slice() {
        let _ = write!(
            parts,
            r#"<div class="card"><h3>{name}</h3><p>{summary}</p></div>"#,
            name = escape_html(&section.name),
            summary = escape_html(&section.summary()),
        );
    }
    if let Some(msg) = view.details.error(fields::SECTIONS) {
        let _ = write!(
            parts,
            r#"<p class="field-error" id="sections-error">{}</p>"#,
            escape_html(msg)
        );
    }
    parts.push_str(&if view.section_open {
        render_section_form(view)
    } else {
        r#"<button type="submit" name="action" value="open_section" class="btn btn-secondary btn-block">+ Add Section</button>"#.to_owned()
    });

    let content = format!(
        r#"{heading}<span class="mode">Advanced Pricing Mode</span>{notices}{receipt}
<form method="post" action="/accurate-quote" novalidate data-submit-once>
{sections_hidden}
<h2>1. YOUR DETAILS</h2>
{name}{phone}
{parts}
<div class="submit-bar"><button type="submit" name="action" value="submit" class="btn btn-primary">GET ACCURATE QUOTE</button></div>
</form>"#,
        heading = page::heading("GET A PRICE", "Quote Builder", "/quote-selection"),
        notices = page::notices(&view.notices),
        receipt = receipt_line(view.receipt.as_ref()),
        sections_hidden = page::hidden(fields::SECTIONS, &sections_json),
        name = page::input(
            NAME_FIELD,
            view.details.value(fields::NAME),
            view.details.error(fields::NAME),
        ),
        phone = page::input(
            PHONE_FIELD,
            view.details.value(fields::PHONE),
            view.details.error(fields::PHONE),
        ),
    );
    Ok(page::layout(&state.config.business_name, "Accurate Quote", &content))
}

fn render_section_form(view: &AccurateQuoteView) -> String {
    let widths: Vec<(&str, String)> = BoardWidth::ALL
        .iter()
        .map(|w| (w.as_str(), format!("{} Board", w.as_str())))
        .collect();
    let width_options: Vec<(&str, &str)> = widths.iter().map(|(v, l)| (*v, l.as_str())).collect();
    let errors = &view.draft_errors;

    format!(
        r#"<div class="card">{name}{height}{length}{width}
<div class="cta-row" style="display:grid;grid-template-columns:1fr 1fr;gap:12px">
<button type="submit" name="action" value="save_section" class="btn btn-primary">SAVE SECTION</button>
<button type="submit" name="action" value="cancel_section" class="btn btn-secondary">CANCEL</button>
</div></div>"#,
        name = page::input(
            Field {
                name: section_fields::NAME,
                label: "Section Name",
                kind: "text",
                placeholder: "e.g. Rear Chimney",
            },
            &view.draft.name,
            errors.get(section_fields::NAME),
        ),
        height = page::input(
            Field {
                name: section_fields::HEIGHT,
                label: "Height (M)",
                kind: "number",
                placeholder: "6",
            },
            &view.draft.height,
            errors.get(section_fields::HEIGHT),
        ),
        length = page::input(
            Field {
                name: section_fields::LENGTH,
                label: "Length (M)",
                kind: "number",
                placeholder: "10",
            },
            &view.draft.length,
            errors.get(section_fields::LENGTH),
        ),
        width = page::choices(
            section_fields::BOARD_WIDTH,
            "Board Width",
            &width_options,
            &view.draft.board_width,
            errors.get(section_fields::BOARD_WIDTH),
        ),
    )
}
