use std::collections::HashMap;

use askama::Template;

use super::PageContext;
use crate::models::submission::{FormSchema, FormType, Submission};
use crate::models::user::User;

/// Entry page for any of the five forms, driven by the form's schema.
#[derive(Template)]
#[template(path = "form.html")]
pub struct FormPageTemplate {
    pub ctx: PageContext,
    pub form_type: FormType,
    pub schema: &'static FormSchema,
    pub errors: Vec<String>,
    /// Previously entered text, for re-rendering after a failed submit.
    pub values: HashMap<String, String>,
}

impl FormPageTemplate {
    pub fn new(ctx: PageContext, form_type: FormType) -> Self {
        FormPageTemplate {
            ctx,
            form_type,
            schema: form_type.schema(),
            errors: Vec::new(),
            values: HashMap::new(),
        }
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn is_selected(&self, name: &str, choice: &str) -> bool {
        self.value(name) == choice
    }

    pub fn is_checked(&self, name: &str) -> bool {
        !self.value(name).is_empty()
    }
}

#[derive(Template)]
#[template(path = "form_success.html")]
pub struct FormSuccessTemplate {
    pub ctx: PageContext,
    pub submission: Submission,
}

#[derive(Template)]
#[template(path = "bonafide_certificate.html")]
pub struct BonafideCertificateTemplate {
    pub ctx: PageContext,
    pub bonafide: Submission,
    pub student: User,
}

impl BonafideCertificateTemplate {
    pub fn student_id(&self) -> &str {
        self.student.student_id.as_deref().unwrap_or("-")
    }
}
