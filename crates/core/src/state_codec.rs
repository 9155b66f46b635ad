//! Bidirectional mapping between the caller-facing state document and the
//! stored state fields.
//!
//! The caller-facing shape ([`StateDocument`]) uses camelCase keys
//! (`raciActivities`, `uploadedFiles`, ...) and carries two derived dates from
//! the owning project. The storage shape ([`StateFields`]) uses snake_case keys
//! and never stores the derived dates.
//!
//! Both directions are driven by the single ordered [`FIELD_SCHEMA`] table:
//! every known field is visited once, present values are copied verbatim and
//! missing or `null` values are replaced by the field's default. Neither
//! direction can fail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::project::ProjectDates;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default value of both filter scalars.
pub const DEFAULT_FILTER: &str = "all";

/// Default UI theme.
pub const DEFAULT_THEME: &str = "light";

/// Default month marker for both calendars.
pub const DEFAULT_CALENDAR_MONTH: &str = "2025-12-01";

/// Caller-facing key of the derived project start date.
pub const START_DATE_KEY: &str = "startDate";

/// Caller-facing key of the derived project go-live date.
pub const GO_LIVE_DATE_KEY: &str = "goLiveDate";

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The value shape of a known state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// An ordered sequence of opaque records. Defaults to `[]`.
    Sequence,
    /// A keyed map of opaque values. Defaults to `{}`.
    Map,
    /// A string enum with the given default.
    Scalar(&'static str),
    /// A month marker string. Defaults to [`DEFAULT_CALENDAR_MONTH`].
    Month,
}

impl FieldKind {
    /// The value substituted when the field is missing or `null`.
    pub fn default_value(self) -> Value {
        match self {
            FieldKind::Sequence => Value::Array(Vec::new()),
            FieldKind::Map => Value::Object(Map::new()),
            FieldKind::Scalar(default) => Value::String(default.to_string()),
            FieldKind::Month => Value::String(DEFAULT_CALENDAR_MONTH.to_string()),
        }
    }

    /// Whether `value` has the JSON shape this kind expects.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Sequence => value.is_array(),
            FieldKind::Map => value.is_object(),
            FieldKind::Scalar(_) | FieldKind::Month => value.is_string(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::Sequence => "an array",
            FieldKind::Map => "an object",
            FieldKind::Scalar(_) | FieldKind::Month => "a string",
        }
    }
}

/// One row of the field schema: the caller-facing key, the storage key and
/// the value kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub app_key: &'static str,
    pub storage_key: &'static str,
    pub kind: FieldKind,
}

const fn field(app_key: &'static str, storage_key: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        app_key,
        storage_key,
        kind,
    }
}

/// Every field the project state knows about, in canonical order.
pub const FIELD_SCHEMA: &[FieldSpec] = &[
    // Core data collections.
    field("tasks", "tasks", FieldKind::Sequence),
    field("vendors", "vendors", FieldKind::Sequence),
    field("risks", "risks", FieldKind::Sequence),
    field("milestones", "milestones", FieldKind::Sequence),
    field("evaluation", "evaluation", FieldKind::Sequence),
    field("stakeholders", "stakeholders", FieldKind::Sequence),
    field("raciActivities", "raci_activities", FieldKind::Sequence),
    field("documents", "documents", FieldKind::Sequence),
    field("decisions", "decisions", FieldKind::Sequence),
    field("meetings", "meetings", FieldKind::Sequence),
    field("meetingNotes", "meeting_notes", FieldKind::Sequence),
    field("uploadedFiles", "uploaded_files", FieldKind::Map),
    field("vendorScores", "vendor_scores", FieldKind::Map),
    // UI state.
    field("currentFilter", "current_filter", FieldKind::Scalar(DEFAULT_FILTER)),
    field(
        "currentVendorFilter",
        "current_vendor_filter",
        FieldKind::Scalar(DEFAULT_FILTER),
    ),
    field("calendarMonth", "calendar_month", FieldKind::Month),
    field("meetingCalendarMonth", "meeting_calendar_month", FieldKind::Month),
    field("theme", "theme", FieldKind::Scalar(DEFAULT_THEME)),
];

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// The caller-facing project state ("AppState"), keyed by camelCase names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDocument(Map<String, Value>);

/// The stored project state fields, keyed by snake_case names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateFields(Map<String, Value>);

impl StateDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Parse a request payload into a document.
    ///
    /// The payload must be a JSON object. Known fields that are present and
    /// non-null must have the shape their [`FieldKind`] expects; unknown keys
    /// are accepted (the codec drops them).
    pub fn from_payload(payload: Value) -> Result<Self, CoreError> {
        let Value::Object(map) = payload else {
            return Err(CoreError::Validation(
                "State data must be a JSON object".to_string(),
            ));
        };

        for spec in FIELD_SCHEMA {
            match map.get(spec.app_key) {
                None | Some(Value::Null) => {}
                Some(value) if spec.kind.accepts(value) => {}
                Some(_) => {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' must be {}",
                        spec.app_key,
                        spec.kind.describe()
                    )));
                }
            }
        }

        Ok(Self(map))
    }
}

impl StateFields {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Build fields from a stored JSON value. Anything but an object is
    /// treated as an empty mapping, which the codec then default-fills.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Encode a caller-facing document into storage fields.
///
/// Unknown keys, including the derived project dates, are dropped.
pub fn to_storage(doc: &StateDocument) -> StateFields {
    let mut out = Map::with_capacity(FIELD_SCHEMA.len());
    for spec in FIELD_SCHEMA {
        let value = present(doc.get(spec.app_key))
            .cloned()
            .unwrap_or_else(|| spec.kind.default_value());
        out.insert(spec.storage_key.to_string(), value);
    }
    StateFields(out)
}

/// Decode storage fields into a caller-facing document, adding the derived
/// `startDate` / `goLiveDate` from the owning project.
pub fn to_app_state(fields: &StateFields, dates: &ProjectDates) -> StateDocument {
    let mut out = Map::with_capacity(FIELD_SCHEMA.len() + 2);
    for spec in FIELD_SCHEMA {
        let value = present(fields.get(spec.storage_key))
            .cloned()
            .unwrap_or_else(|| spec.kind.default_value());
        out.insert(spec.app_key.to_string(), value);
    }
    out.insert(
        START_DATE_KEY.to_string(),
        Value::String(dates.start_date.to_string()),
    );
    out.insert(
        GO_LIVE_DATE_KEY.to_string(),
        Value::String(dates.go_live_date.to_string()),
    );
    StateDocument(out)
}

/// The fully defaulted storage mapping used for freshly created records.
pub fn default_fields() -> StateFields {
    to_storage(&StateDocument::default())
}
