use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Timestamp format used by the case API.
const CASE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Status value the case API uses for closed cases.
pub const CLOSED_STATUS: &str = "Closed";

/// Case details as returned by the case API. Every field is optional; an
/// absent or empty value means "no data".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct CaseRecord {
    #[serde(deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "text")]
    pub problem_desc: Option<String>,

    #[serde(deserialize_with = "text")]
    pub owner_user_id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub owner_first_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub owner_last_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub owner_email_address: Option<String>,

    #[serde(deserialize_with = "text")]
    pub contract_id: Option<String>,

    #[serde(deserialize_with = "text")]
    pub contact_user_id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub contact_user_first_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub contact_user_last_name: Option<String>,
    #[serde(deserialize_with = "ids")]
    pub contact_email_ids: Vec<String>,
    #[serde(deserialize_with = "ids")]
    pub contact_business_phone_numbers: Vec<String>,
    #[serde(deserialize_with = "ids")]
    pub contact_mobile_phone_numbers: Vec<String>,

    #[serde(deserialize_with = "text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "text")]
    pub severity: Option<String>,

    #[serde(deserialize_with = "text")]
    pub serial_number: Option<String>,
    #[serde(deserialize_with = "text")]
    pub device_name: Option<String>,

    #[serde(deserialize_with = "ids")]
    pub rmas: Vec<String>,

    #[serde(deserialize_with = "text")]
    pub creation_date: Option<String>,
    #[serde(deserialize_with = "text")]
    pub updated_date: Option<String>,
}

impl CaseRecord {
    pub fn is_closed(&self) -> bool {
        self.status.as_deref() == Some(CLOSED_STATUS)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.creation_date.as_deref().and_then(parse_case_date)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_date.as_deref().and_then(parse_case_date)
    }
}

/// Envelope the case API wraps a single case in:
/// `{"RESPONSE": {"CASES": {"CASE_DETAIL": {...}}}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub(crate) struct CaseEnvelope {
    response: Option<CaseList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
struct CaseList {
    cases: Option<CaseDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
struct CaseDetail {
    case_detail: Option<CaseRecord>,
}

impl CaseEnvelope {
    pub(crate) fn into_record(self) -> Option<CaseRecord> {
        self.response?.cases?.case_detail
    }
}

pub fn parse_case_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), CASE_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Scalars become strings; null and blank values become `None`.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar(&value))
}

/// Collections arrive as `{"ID": "x"}`, `{"ID": ["x", "y"]}`, a bare string
/// or list, or an empty value when there is nothing to report.
fn ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(collect_ids(&value))
}

fn collect_ids(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.get("ID").map(collect_ids).unwrap_or_default(),
        Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    }
}

fn scalar(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
