//! Quote requests: the quick estimate and the itemized accurate quote.
//!
//! Both forms follow the same convention: every validator runs, failures land
//! in an [`ErrorMap`], and a typed request is produced only when the map is
//! empty. The accurate quote additionally builds an ordered list of measured
//! [`Section`]s from a transient [`SectionDraft`].

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::form::{ErrorMap, FormState};
use crate::validation::{
    validate_length, validate_phone, validate_positive_number, validate_required,
};

/// Upper bound on the free-text quick estimate description.
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Kind of job a quick estimate is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    NewBuild,
    Renovation,
    Roofing,
    Painting,
}

impl JobType {
    pub const ALL: [Self; 4] = [Self::NewBuild, Self::Renovation, Self::Roofing, Self::Painting];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NewBuild => "New Build",
            Self::Renovation => "Renovation",
            Self::Roofing => "Roofing",
            Self::Painting => "Painting",
        }
    }

    /// Form value used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewBuild => "new_build",
            Self::Renovation => "renovation",
            Self::Roofing => "roofing",
            Self::Painting => "painting",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// Width of the boards on a scaffold run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoardWidth {
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[default]
    #[serde(rename = "5")]
    Five,
}

impl BoardWidth {
    pub const ALL: [Self; 3] = [Self::Three, Self::Four, Self::Five];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == value.trim())
    }
}

/// One measured scaffold run. Immutable once added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Creation timestamp in milliseconds, unique within a [`SectionList`].
    pub id: i64,
    pub name: String,
    /// Metres.
    pub height: f64,
    /// Metres.
    pub length: f64,
    pub board_width: BoardWidth,
}

impl Section {
    /// `6m × 10m • 5 Board`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}m × {}m • {} Board",
            self.height,
            self.length,
            self.board_width.as_str()
        )
    }
}

/// The in-progress section, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDraft {
    pub name: String,
    pub height: String,
    pub length: String,
    /// Raw form value; must parse as a [`BoardWidth`].
    pub board_width: String,
}

impl Default for SectionDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            height: String::new(),
            length: String::new(),
            board_width: BoardWidth::default().as_str().to_owned(),
        }
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub name: String,
    pub height: f64,
    pub length: f64,
    pub board_width: BoardWidth,
}

/// Form keys used by the section draft.
pub mod section_fields {
    pub const NAME: &str = "section_name";
    pub const HEIGHT: &str = "height";
    pub const LENGTH: &str = "length";
    pub const BOARD_WIDTH: &str = "board_width";
}

impl SectionDraft {
    /// Validate every draft field.
    ///
    /// # Errors
    ///
    /// Returns the [`ErrorMap`] of every invalid field.
    pub fn validate(&self) -> Result<ValidDraft, ErrorMap> {
        use section_fields::{BOARD_WIDTH, HEIGHT, LENGTH, NAME};

        let mut errors = ErrorMap::new();
        errors.check(NAME, validate_required(&self.name, "Section name"));

        let height = if errors.check(HEIGHT, validate_required(&self.height, "Height")) {
            let parsed = validate_positive_number(&self.height, "Height");
            errors.check(HEIGHT, parsed.clone());
            parsed.ok()
        } else {
            None
        };

        let length = if errors.check(LENGTH, validate_required(&self.length, "Length")) {
            let parsed = validate_positive_number(&self.length, "Length");
            errors.check(LENGTH, parsed.clone());
            parsed.ok()
        } else {
            None
        };

        let board_width = BoardWidth::parse(&self.board_width);
        if board_width.is_none() {
            errors.insert_if_absent(BOARD_WIDTH, "Please choose a board width");
        }

        match (height, length, board_width) {
            (Some(height), Some(length), Some(board_width)) if errors.is_empty() => {
                Ok(ValidDraft {
                    name: self.name.trim().to_owned(),
                    height,
                    length,
                    board_width,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Message shown when a round-tripped section list fails its checks.
pub const INVALID_SECTIONS: &str = "The section list is invalid. Please start your quote again.";

/// Ordered sections of an accurate quote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionList {
    sections: Vec<Section>,
}

impl SectionList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from previously added sections (e.g. round-tripped through a page).
    ///
    /// Every section must hold what [`SectionList::add`] would have accepted:
    /// a non-blank name, finite positive measurements and an id not used by
    /// any earlier section.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorMap`] with [`INVALID_SECTIONS`] under
    /// [`fields::SECTIONS`].
    pub fn from_sections(sections: Vec<Section>) -> Result<Self, ErrorMap> {
        let mut ids = HashSet::with_capacity(sections.len());
        let valid = sections.iter().all(|section| {
            !section.name.trim().is_empty()
                && is_measurement(section.height)
                && is_measurement(section.length)
                && ids.insert(section.id)
        });

        if !valid {
            let mut errors = ErrorMap::new();
            errors.insert(fields::SECTIONS, INVALID_SECTIONS);
            return Err(errors);
        }
        Ok(Self { sections })
    }

    /// Validate `draft` and append it.
    ///
    /// Nothing is appended when validation fails.
    ///
    /// # Errors
    ///
    /// Returns the draft's [`ErrorMap`].
    pub fn add(&mut self, draft: &SectionDraft) -> Result<&Section, ErrorMap> {
        self.add_at(draft, Utc::now().timestamp_millis())
    }

    fn add_at(&mut self, draft: &SectionDraft, now_ms: i64) -> Result<&Section, ErrorMap> {
        let valid = draft.validate()?;
        let id = self.next_id(now_ms);
        self.sections.push(Section {
            id,
            name: valid.name,
            height: valid.height,
            length: valid.length,
            board_width: valid.board_width,
        });
        let index = self.sections.len() - 1;
        Ok(&self.sections[index])
    }

    /// Timestamp ids, bumped past the newest existing id on collision.
    fn next_id(&self, now_ms: i64) -> i64 {
        match self.sections.iter().map(|s| s.id).max() {
            Some(last) if now_ms <= last => last.saturating_add(1),
            _ => now_ms,
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Section> {
        self.sections
    }
}

fn is_measurement(metres: f64) -> bool {
    metres.is_finite() && metres > 0.0
}

/// Keys shared by both quote forms.
pub mod fields {
    pub const NAME: &str = "name";
    pub const PHONE: &str = "phone";
    pub const JOB_TYPE: &str = "job_type";
    pub const DESCRIPTION: &str = "description";
    pub const SECTIONS: &str = "sections";
}

/// A validated quick estimate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickEstimateRequest {
    pub name: String,
    pub phone: String,
    pub job_type: Option<JobType>,
    pub description: String,
}

/// A validated accurate quote request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccurateQuoteRequest {
    pub name: String,
    pub phone: String,
    pub sections: Vec<Section>,
}

fn check_contact(values: &FormState, errors: &mut ErrorMap) {
    errors.check(fields::NAME, validate_required(values.get(fields::NAME), "Name"));

    let phone = values.get(fields::PHONE);
    if errors.check(fields::PHONE, validate_required(phone, "Phone")) && !validate_phone(phone) {
        errors.insert_if_absent(fields::PHONE, "Please enter a valid phone number");
    }
}

/// Validate the quick estimate form.
///
/// # Errors
///
/// Returns the [`ErrorMap`] of every invalid field.
pub fn validate_quick_estimate(values: &FormState) -> Result<QuickEstimateRequest, ErrorMap> {
    let mut errors = ErrorMap::new();
    check_contact(values, &mut errors);

    let raw_job = values.get(fields::JOB_TYPE).trim();
    let job_type = if raw_job.is_empty() {
        None
    } else {
        let parsed = JobType::parse(raw_job);
        if parsed.is_none() {
            errors.insert_if_absent(fields::JOB_TYPE, "Please choose a listed job type");
        }
        parsed
    };

    let description = values.get(fields::DESCRIPTION);
    if errors.check(
        fields::DESCRIPTION,
        validate_required(description, "Description"),
    ) {
        errors.check(
            fields::DESCRIPTION,
            validate_length(description, "Description", None, Some(DESCRIPTION_MAX_CHARS)),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(QuickEstimateRequest {
        name: values.get(fields::NAME).trim().to_owned(),
        phone: values.get(fields::PHONE).trim().to_owned(),
        job_type,
        description: description.trim().to_owned(),
    })
}

/// Validate the accurate quote contact details and section list.
///
/// # Errors
///
/// Returns the [`ErrorMap`] of every invalid field.
pub fn validate_accurate_quote(
    values: &FormState,
    sections: &SectionList,
) -> Result<AccurateQuoteRequest, ErrorMap> {
    let mut errors = ErrorMap::new();
    check_contact(values, &mut errors);

    if sections.is_empty() {
        errors.insert_if_absent(fields::SECTIONS, "Add at least one section");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(AccurateQuoteRequest {
        name: values.get(fields::NAME).trim().to_owned(),
        phone: values.get(fields::PHONE).trim().to_owned(),
        sections: sections.as_slice().to_vec(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(name: &str, height: &str, length: &str) -> SectionDraft {
        SectionDraft {
            name: name.to_owned(),
            height: height.to_owned(),
            length: length.to_owned(),
            board_width: "5".to_owned(),
        }
    }

    fn section(id: i64, name: &str, height: f64, length: f64) -> Section {
        Section {
            id,
            name: name.to_owned(),
            height,
            length,
            board_width: BoardWidth::Four,
        }
    }

    fn contact(name: &str, phone: &str) -> FormState {
        let mut values = FormState::with_fields(&[
            fields::NAME,
            fields::PHONE,
            fields::JOB_TYPE,
            fields::DESCRIPTION,
        ]);
        values.set(fields::NAME, name);
        values.set(fields::PHONE, phone);
        values
    }

    // --- sections ---

    #[test]
    fn empty_height_and_length_yield_exactly_two_errors() {
        let mut list = SectionList::new();
        let errors = list.add(&draft("Rear Chimney", "", "")).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["height", "length"]);
        assert!(list.is_empty());
    }

    #[test]
    fn non_numeric_height_is_rejected() {
        let mut list = SectionList::new();
        let errors = list.add(&draft("Front", "tall", "10")).unwrap_err();
        assert_eq!(errors.get("height"), Some("Height must be a positive number"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn valid_draft_appends_in_order() {
        let mut list = SectionList::new();
        list.add(&draft("Front", "6", "10")).unwrap();
        list.add(&draft(" Rear Chimney ", "8.5", "3")).unwrap();

        let names: Vec<_> = list.as_slice().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Front", "Rear Chimney"]);
        assert_eq!(list.as_slice()[1].summary(), "8.5m × 3m • 5 Board");
    }

    #[test]
    fn ids_stay_unique_when_clock_collides() {
        let mut list = SectionList::new();
        let a = list.add_at(&draft("A", "1", "1"), 1_000).unwrap().id;
        let b = list.add_at(&draft("B", "1", "1"), 1_000).unwrap().id;
        let c = list.add_at(&draft("C", "1", "1"), 999).unwrap().id;
        assert_eq!((a, b, c), (1_000, 1_001, 1_002));
    }

    #[test]
    fn unknown_board_width_is_rejected_not_defaulted() {
        let mut list = SectionList::new();
        let mut bad = draft("Front", "6", "10");
        bad.board_width = "9".to_owned();

        let errors = list.add(&bad).unwrap_err();
        assert_eq!(errors.get("board_width"), Some("Please choose a board width"));
        assert_eq!(errors.len(), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn chosen_board_width_is_kept() {
        let mut list = SectionList::new();
        let mut narrow = draft("Side", "4", "2");
        narrow.board_width = "3".to_owned();
        assert_eq!(list.add(&narrow).unwrap().board_width, BoardWidth::Three);
        assert_eq!(SectionDraft::default().board_width, "5");
    }

    #[test]
    fn from_sections_accepts_what_add_produces() {
        let mut list = SectionList::new();
        list.add_at(&draft("Front", "6", "10"), 1_000).unwrap();
        list.add_at(&draft("Rear", "8.5", "3"), 1_000).unwrap();

        let rebuilt = SectionList::from_sections(list.clone().into_vec()).unwrap();
        assert_eq!(rebuilt, list);
    }

    #[test]
    fn from_sections_rejects_forged_entries() {
        let forged = [
            vec![section(1, "  ", 6.0, 10.0)],
            vec![section(1, "Front", -5.0, 10.0)],
            vec![section(1, "Front", 6.0, 0.0)],
            vec![section(1, "Front", f64::NAN, 10.0)],
            vec![section(1, "Front", 6.0, 10.0), section(1, "Rear", 2.0, 3.0)],
        ];
        for sections in forged {
            let errors = SectionList::from_sections(sections.clone()).unwrap_err();
            assert_eq!(errors.get("sections"), Some(INVALID_SECTIONS), "{sections:?}");
        }
    }

    #[test]
    fn board_width_round_trips_as_digit() {
        let json = serde_json::to_string(&BoardWidth::Three).unwrap();
        assert_eq!(json, "\"3\"");
        assert_eq!(BoardWidth::parse(" 4 "), Some(BoardWidth::Four));
        assert_eq!(BoardWidth::parse("6"), None);
    }

    // --- quick estimate ---

    #[test]
    fn quick_estimate_reports_all_missing_fields() {
        let errors = validate_quick_estimate(&contact("", "")).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["description", "name", "phone"]
        );
    }

    #[test]
    fn quick_estimate_bad_phone_and_job_type() {
        let mut values = contact("Joe", "123");
        values.set(fields::JOB_TYPE, "demolition");
        values.set(fields::DESCRIPTION, "Front of house, 2 lifts");

        let errors = validate_quick_estimate(&values).unwrap_err();
        assert_eq!(errors.get("phone"), Some("Please enter a valid phone number"));
        assert_eq!(errors.get("job_type"), Some("Please choose a listed job type"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn quick_estimate_valid() {
        let mut values = contact(" Joe Bloggs ", "07700 900000");
        values.set(fields::JOB_TYPE, "roofing");
        values.set(fields::DESCRIPTION, "Front of house for painting, 2 lifts");

        let request = validate_quick_estimate(&values).unwrap();
        assert_eq!(request.name, "Joe Bloggs");
        assert_eq!(request.job_type, Some(JobType::Roofing));
    }

    #[test]
    fn quick_estimate_description_too_long() {
        let mut values = contact("Joe", "07700 900000");
        values.set(fields::DESCRIPTION, "x".repeat(DESCRIPTION_MAX_CHARS + 1));
        let errors = validate_quick_estimate(&values).unwrap_err();
        assert!(errors.is_invalid("description"));
    }

    // --- accurate quote ---

    #[test]
    fn accurate_quote_needs_a_section() {
        let errors =
            validate_accurate_quote(&contact("Joe", "07700 900000"), &SectionList::new())
                .unwrap_err();
        assert_eq!(errors.get("sections"), Some("Add at least one section"));
    }

    #[test]
    fn accurate_quote_valid() {
        let mut list = SectionList::new();
        list.add(&draft("Front", "6", "10")).unwrap();
        let request = validate_accurate_quote(&contact("Joe", "07700 900000"), &list).unwrap();
        assert_eq!(request.sections.len(), 1);
    }
}
