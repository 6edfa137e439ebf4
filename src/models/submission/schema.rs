//! Static field descriptors for the five form types.
//!
//! Every form is a flat list of [`FieldSpec`]s. Parsing raw request text
//! into typed [`FieldValue`]s is driven entirely by these tables, so adding a
//! field to a form means adding one line here.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::types::{FieldValue, Fields, FormType};
use crate::auth::validate::{validate_optional, validate_required};

const GENDERS: &[(&str, &str)] = &[("male", "मुलगा / Male"), ("female", "मुलगी / Female")];

const DEFAULT_MAX_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Date,
    Integer,
    Bool,
    Choice(&'static [(&'static str, &'static str)]),
    /// Photo upload. A non-image attachment rejects the whole submission.
    Image,
    /// Any upload on the global allow-list. Other files are dropped.
    Attachment,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: usize,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, label, kind, required: false, max_len: DEFAULT_MAX_LEN }
}

const fn text(name: &'static str, label: &'static str) -> FieldSpec {
    field(name, label, FieldKind::Text)
}

const fn long(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { max_len: 2000, ..field(name, label, FieldKind::LongText) }
}

const fn date(name: &'static str, label: &'static str) -> FieldSpec {
    field(name, label, FieldKind::Date)
}

const fn int(name: &'static str, label: &'static str) -> FieldSpec {
    field(name, label, FieldKind::Integer)
}

const fn flag(name: &'static str, label: &'static str) -> FieldSpec {
    field(name, label, FieldKind::Bool)
}

impl FieldSpec {
    const fn required(self) -> Self {
        FieldSpec { required: true, ..self }
    }

    const fn max(self, max_len: usize) -> Self {
        FieldSpec { max_len, ..self }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, FieldKind::Image | FieldKind::Attachment)
    }

    pub fn is_textarea(&self) -> bool {
        self.kind == FieldKind::LongText
    }

    pub fn is_checkbox(&self) -> bool {
        self.kind == FieldKind::Bool
    }

    pub fn choices(&self) -> &'static [(&'static str, &'static str)] {
        match self.kind {
            FieldKind::Choice(c) => c,
            _ => &[],
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }

    /// `type` attribute of the HTML input.
    pub fn input_type(&self) -> &'static str {
        match self.kind {
            FieldKind::Date => "date",
            FieldKind::Integer => "number",
            FieldKind::Bool => "checkbox",
            FieldKind::Image | FieldKind::Attachment => "file",
            _ => "text",
        }
    }

    /// `accept` attribute for file inputs.
    pub fn accept(&self) -> &'static str {
        match self.kind {
            FieldKind::Image => ".jpg,.jpeg,.png,.gif",
            FieldKind::Attachment => ".jpg,.jpeg,.png,.gif,.pdf",
            _ => "",
        }
    }

    /// Parse the raw text value of a non-file field.
    ///
    /// Returns `Ok(None)` for an absent optional value. File fields are
    /// always `Ok(None)` here; attachments go through the upload handler.
    pub fn parse(&self, raw: Option<&str>) -> Result<Option<FieldValue>, String> {
        let raw = raw.map(str::trim).unwrap_or("");
        match self.kind {
            FieldKind::Image | FieldKind::Attachment => return Ok(None),
            FieldKind::Bool => return Ok(Some(FieldValue::Bool(is_checked(raw)))),
            _ => {}
        }

        let problem = if self.required {
            validate_required(raw, self.label, self.max_len)
        } else {
            validate_optional(raw, self.label, self.max_len)
        };
        if let Some(msg) = problem {
            return Err(msg);
        }
        if raw.is_empty() {
            return Ok(None);
        }

        match self.kind {
            FieldKind::Text | FieldKind::LongText => Ok(Some(FieldValue::Text(raw.to_string()))),
            FieldKind::Date => {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| Some(FieldValue::Date(d))).map_err(
                    |_| format!("{}: तारीख YYYY-MM-DD स्वरूपात हवी / must be a date (YYYY-MM-DD)", self.label),
                )
            }
            FieldKind::Integer => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => Ok(Some(FieldValue::Integer(n))),
                _ => Err(format!("{}: पूर्ण संख्या हवी / must be a whole number", self.label)),
            },
            FieldKind::Choice(choices) => {
                if choices.iter().any(|(value, _)| *value == raw) {
                    Ok(Some(FieldValue::Text(raw.to_string())))
                } else {
                    Err(format!("{}: अवैध पर्याय / has an invalid choice", self.label))
                }
            }
            FieldKind::Bool | FieldKind::Image | FieldKind::Attachment => Ok(None),
        }
    }
}

fn is_checked(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "on" | "y" | "yes" | "true" | "1")
}

#[derive(Debug)]
pub struct FormSchema {
    pub form_type: FormType,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn file_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.is_file())
    }

    pub fn has_files(&self) -> bool {
        self.file_fields().next().is_some()
    }

    /// Parse every non-file field, collecting all problems instead of
    /// stopping at the first one.
    pub fn parse_fields(&self, raw: &HashMap<String, String>) -> Result<Fields, Vec<String>> {
        let mut fields = Fields::new();
        let mut errors = Vec::new();
        for spec in self.fields {
            match spec.parse(raw.get(spec.name).map(String::as_str)) {
                Ok(Some(value)) => {
                    fields.insert(spec.name.to_string(), value);
                }
                Ok(None) => {}
                Err(msg) => errors.push(msg),
            }
        }
        if errors.is_empty() { Ok(fields) } else { Err(errors) }
    }
}

pub static ADMISSION: FormSchema = FormSchema {
    form_type: FormType::Admission,
    fields: &[
        text("school_name", "शाळेचे नाव / School name").required(),
        text("continuous_student_id", "विद्यार्थी सतत ID / Continuous student ID").max(50),
        text("udise_pen", "U-DISE+ पोर्टल SDMS - STUDENT PEN").max(50),
        text("admission_class", "प्रवेश इयत्ता / Admission class").max(20),
        text("birth_register_no", "जन्माचा रजिस्टर नं. / Birth register no.").max(50),
        text("aadhaar_no", "आधार कार्ड नं. / Aadhaar no.").max(12),
        date("birth_date", "जन्मतारीख / Birth date"),
        date("admission_date", "शाळेत प्रवेश तारीख / Admission date"),
        field("gender", "लिंग / Gender", FieldKind::Choice(GENDERS)),
        field("student_photo", "विद्यार्थ्याचे फोटो / Student photo", FieldKind::Image),
        field("parent_photo", "पालकांचे फोटो / Parent photo", FieldKind::Image),
        text("first_name_marathi", "प्रथम नाव (मराठी) / First name").required().max(100),
        text("last_name_marathi", "आडनाव (मराठी) / Last name").required().max(100),
        text("father_name", "वडिलांचे नाव / Father's name").required().max(100),
        text("mother_name", "आईचे नाव / Mother's name").required().max(100),
        text("birth_date_words", "जन्मतारीख अक्षरी / Birth date in words"),
        text("religion", "धर्म / Religion").max(50),
        text("caste", "जात / Caste").max(50),
        text("sub_caste", "पोटजात / Sub-caste").max(50),
        text("caste_certificate", "जात प्रमाण / Caste certificate").max(100),
        flag("is_minority", "अल्पसंख्याक / Minority"),
        text("nationality", "राष्ट्रत्व / Nationality").max(50),
        text("mother_tongue", "मातृभाषा / Mother tongue").max(50),
        text("mobile_number", "मोबाईल क्रमांक / Mobile number").max(15),
        flag("bpl_status", "BPL स्थिती / BPL status"),
        text("bpl_number", "BPL क्रमांक / BPL number").max(50),
        flag("disability_status", "दिव्यांग स्थिती / Disability status"),
        text("disability_type", "दिव्यांग प्रकार / Disability type").max(100),
        text("parent_full_name", "पालकांचे संपूर्ण नाव / Parent's full name").required(),
        long("address", "पत्ता / Address").required(),
    ],
};

const CERTIFICATE_FIELDS: &[FieldSpec] = &[
    text("student_name", "विद्यार्थ्याचे पूर्ण नाव / Student's full name").required(),
    text("academic_year", "शैक्षणिक वर्ष / Academic year").required().max(20),
    text("class_standard", "इयत्ता / Class").required().max(20),
    text("division", "तुकडी / Division").required().max(10),
    text("conduct", "वर्तन / Conduct").required().max(50),
    text("caste", "जात / Caste").required().max(50),
    date("birth_date", "जन्मतारीख / Birth date").required(),
    text("birth_place", "जन्मस्थान / Birth place").required().max(100),
    text("school_place", "शाळेचे स्थळ / School place").required().max(100),
];

pub static BONAFIDE: FormSchema = FormSchema {
    form_type: FormType::Bonafide,
    fields: CERTIFICATE_FIELDS,
};

pub static PRATINIDHAN: FormSchema = FormSchema {
    form_type: FormType::Pratinidhan,
    fields: CERTIFICATE_FIELDS,
};

pub static HOSTEL: FormSchema = FormSchema {
    form_type: FormType::Hostel,
    fields: &[
        text("hostel_name", "वसतिगृहाचे नाव / Hostel name").required(),
        text("hostel_address", "वसतिगृहाचा पत्ता / Hostel address").max(300),
        text("parent_name", "पालकांचे नाव / Parent's name").required(),
        long("parent_address", "पालकांचा पत्ता / Parent's address").required(),
        text("student_name", "विद्यार्थ्याचे नाव / Student's name").required(),
        long("student_address", "विद्यार्थ्याचा पत्ता / Student's address").required(),
        text("phone", "फोन / Phone").max(15),
        text("caste", "जात / Caste").max(100),
        text("birth_village", "जन्म गाव / Birth village").max(100),
        text("birth_taluka", "जन्म तालुका / Birth taluka").max(100),
        text("birth_district", "जन्म जिल्हा / Birth district").max(100),
        date("birth_date", "जन्मतारीख / Birth date"),
        int("age_years", "वय (वर्षे) / Age (years)"),
        int("age_months", "वय (महिने) / Age (months)"),
        text("education", "शिक्षण / Education"),
        long("previous_school", "पूर्वीची शाळा / Previous school"),
        text("annual_income", "वार्षिक उत्पन्न / Annual income").max(100),
        long("exam_results", "परीक्षा निकाल / Exam results"),
        text("guardian_name", "पालकाचे नाव / Guardian's name"),
        text("register_number", "रजिस्टर क्रमांक / Register number").max(50),
        date("received_date", "मिळाल्याची तारीख / Received date"),
        field("parent_signature", "पालकांची सही / Parent's signature", FieldKind::Attachment),
        field("student_signature", "विद्यार्थ्याची सही / Student's signature", FieldKind::Attachment),
        field("warden_signature", "गृहपालाची सही / Warden's signature", FieldKind::Attachment),
    ],
};

pub static CASE_RECORD: FormSchema = FormSchema {
    form_type: FormType::CaseRecord,
    fields: &[
        text("name", "नाव / Name").required(),
        date("birth_date", "जन्मतारीख / Birth date"),
        int("age", "वय / Age"),
        field("gender", "लिंग / Gender", FieldKind::Choice(GENDERS)),
        text("education", "शिक्षण / Education"),
        text("father_name", "वडिलांचे नाव / Father's name"),
        text("father_education", "वडिलांचे शिक्षण / Father's education").max(100),
        text("father_occupation", "वडिलांचा व्यवसाय / Father's occupation").max(100),
        text("father_income", "वडिलांचे उत्पन्न / Father's income").max(50),
        text("mother_name", "आईचे नाव / Mother's name"),
        text("mother_education", "आईचे शिक्षण / Mother's education").max(100),
        text("mother_occupation", "आईचा व्यवसाय / Mother's occupation").max(100),
        text("mother_income", "आईचे उत्पन्न / Mother's income").max(50),
        text("guardian_name", "पालकाचे नाव / Guardian's name"),
        text("guardian_education", "पालकाचे शिक्षण / Guardian's education").max(100),
        text("guardian_occupation", "पालकाचा व्यवसाय / Guardian's occupation").max(100),
        text("guardian_income", "पालकाचे उत्पन्न / Guardian's income").max(50),
        long("guardian_address", "पालकाचा पत्ता / Guardian's address"),
        text("guardian_mobile", "पालकाचा मोबाईल / Guardian's mobile").max(15),
        long("relatives_address", "नातेवाईकांचा पत्ता / Relatives' address"),
        long("permanent_address", "कायमचा पत्ता / Permanent address"),
        text("economic_status", "आर्थिक स्थिती / Economic status").max(50),
        text("area_type", "क्षेत्र प्रकार / Area type").max(50),
        text("religion", "धर्म / Religion").max(50),
        text("caste", "जात / Caste").max(50),
        text("mother_tongue", "मातृभाषा / Mother tongue").max(50),
        text("info_relation_personal", "माहिती देणाऱ्याचे नाते / Informant's relation"),
        text("contact_duration", "संपर्क कालावधी / Contact duration").max(100),
        text("info_trustworthiness", "माहितीची विश्वसनीयता / Trustworthiness").max(50),
        text("info_completeness", "माहितीची पूर्णता / Completeness").max(50),
        long("complaint_details", "तक्रारीचा तपशील / Complaint details"),
        text("past_treatment_medications", "पूर्वीचे उपचार: औषधे / Past medications").max(50),
        text("past_treatment_professional", "पूर्वीचे उपचार: तज्ञ / Past professional help").max(50),
        text("past_treatment_physical", "पूर्वीचे उपचार: शारीरिक / Past physical treatment").max(50),
        text("past_treatment_other", "पूर्वीचे उपचार: इतर / Other past treatment").max(50),
    ],
};
