use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{self, FormSchema};
use crate::errors::AppError;

/// The five kinds of form a student can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormType {
    Admission,
    Bonafide,
    Hostel,
    CaseRecord,
    Pratinidhan,
}

impl FormType {
    pub const ALL: [FormType; 5] = [
        FormType::Admission,
        FormType::Bonafide,
        FormType::Hostel,
        FormType::CaseRecord,
        FormType::Pratinidhan,
    ];

    /// URL / storage key.
    pub fn slug(&self) -> &'static str {
        match self {
            FormType::Admission => "admission",
            FormType::Bonafide => "bonafide",
            FormType::Hostel => "hostel",
            FormType::CaseRecord => "case_record",
            FormType::Pratinidhan => "pratinidhan",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FormType::Admission => "प्रवेश अर्ज / Admission Form",
            FormType::Bonafide => "बोनाफाइड प्रमाणपत्र / Bonafide Certificate",
            FormType::Hostel => "वसतिगृह अर्ज / Hostel Application",
            FormType::CaseRecord => "केस रेकॉर्ड / Case Record",
            FormType::Pratinidhan => "प्रतिनिधान प्रमाणपत्र / Pratinidhan Certificate",
        }
    }

    /// Path of the page that shows and accepts this form.
    pub fn form_path(&self) -> String {
        format!("/{}_form", self.slug())
    }

    /// Fields that identify the person a submission is about.
    pub fn summary_fields(&self) -> &'static [&'static str] {
        match self {
            FormType::Admission => &["first_name_marathi", "last_name_marathi"],
            FormType::CaseRecord => &["name"],
            FormType::Bonafide | FormType::Hostel | FormType::Pratinidhan => &["student_name"],
        }
    }

    pub fn schema(&self) -> &'static FormSchema {
        match self {
            FormType::Admission => &schema::ADMISSION,
            FormType::Bonafide => &schema::BONAFIDE,
            FormType::Hostel => &schema::HOSTEL,
            FormType::CaseRecord => &schema::CASE_RECORD,
            FormType::Pratinidhan => &schema::PRATINIDHAN,
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for FormType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormType::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| AppError::UnknownFormType(s.to_string()))
    }
}

/// Review state of a submission. Any state may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Approved, Status::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }

    /// CSS modifier used for status badges.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Status::Pending => "warning",
            Status::Approved => "success",
            Status::Rejected => "danger",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "प्रलंबित / Pending",
            Status::Approved => "मंजूर / Approved",
            Status::Rejected => "नाकारले / Rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| AppError::InvalidStatus(s.to_string()))
    }
}

/// A single typed field value stored in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Integer(i64),
    Bool(bool),
    /// Stored upload reference (file name under the upload directory).
    File(String),
}

impl FieldValue {
    /// Human readable rendering for pages and certificates.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::File(s) => s.clone(),
            FieldValue::Date(d) => d.format("%d-%m-%Y").to_string(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Bool(true) => "होय / Yes".to_string(),
            FieldValue::Bool(false) => "नाही / No".to_string(),
        }
    }
}

pub type Fields = BTreeMap<String, FieldValue>;

/// A stored form record of any type.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: i64,
    pub form_type: FormType,
    pub user_id: i64,
    pub fields: Fields,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Display string of a field, empty when absent.
    pub fn value(&self, name: &str) -> String {
        self.get(name).map(FieldValue::display).unwrap_or_default()
    }

    /// Upload reference of a file field, if one was stored.
    pub fn file(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::File(f)) => Some(f.as_str()),
            _ => None,
        }
    }

    pub fn created_display(&self) -> String {
        self.created_at.format("%d-%m-%Y %H:%M").to_string()
    }

    /// Short identifying text, e.g. the student's name.
    pub fn summary(&self) -> String {
        self.form_type
            .summary_fields()
            .iter()
            .map(|name| self.value(name))
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Present fields in schema order, for detail views.
    pub fn rows(&self) -> Vec<FieldRow> {
        self.form_type
            .schema()
            .fields
            .iter()
            .filter_map(|spec| {
                let value = self.get(spec.name)?;
                Some(FieldRow {
                    label: spec.label,
                    value: value.display(),
                    is_file: matches!(value, FieldValue::File(_)),
                })
            })
            .collect()
    }
}

/// One label/value line of a submission detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub label: &'static str,
    pub value: String,
    pub is_file: bool,
}

/// Data for a submission about to be inserted (always starts pending).
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub form_type: FormType,
    pub user_id: i64,
    pub fields: Fields,
}

/// A submission joined with its owner, for admin lists.
#[derive(Debug, Clone)]
pub struct ReviewItem {
    pub submission: Submission,
    pub student_name: String,
    pub student_id: Option<String>,
}

impl ReviewItem {
    pub fn student_id_display(&self) -> &str {
        self.student_id.as_deref().unwrap_or("-")
    }
}
