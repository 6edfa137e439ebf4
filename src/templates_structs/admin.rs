use askama::Template;

use super::PageContext;
use crate::models::submission::{FormType, ReviewItem, Status};

#[derive(Template)]
#[template(path = "admin_forms.html")]
pub struct AdminFormsTemplate {
    pub ctx: PageContext,
    pub form_type: FormType,
    pub items: Vec<ReviewItem>,
    pub statuses: [Status; 3],
}
