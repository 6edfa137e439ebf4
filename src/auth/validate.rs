/// Validate a username: 4-20 chars, alphanumeric and underscore only.
pub fn validate_username(username: &str) -> Option<String> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    if trimmed.is_empty() {
        return Some("वापरकर्ता नाव आवश्यक आहे / Username is required".to_string());
    }
    if len < 4 {
        return Some("वापरकर्ता नाव किमान 4 अक्षरांचे हवे / Username must be at least 4 characters".to_string());
    }
    if len > 20 {
        return Some("वापरकर्ता नाव जास्तीत जास्त 20 अक्षरांचे हवे / Username must be at most 20 characters".to_string());
    }
    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Some("वापरकर्ता नावात फक्त अक्षरे, अंक आणि _ चालतील / Username may only contain letters, numbers, and underscores".to_string());
    }
    None
}

/// Validate an email: must contain '@' and '.', max 120 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("ईमेल आवश्यक आहे / Email is required".to_string());
    }
    if trimmed.len() > 120 {
        return Some("ईमेल जास्तीत जास्त 120 अक्षरांचा हवा / Email must be at most 120 characters".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
        _ => Some("वैध ईमेल पत्ता द्या / Email must be a valid address".to_string()),
    }
}

/// Validate a new password and its confirmation.
pub fn validate_password(password: &str, confirm: &str) -> Option<String> {
    if password.is_empty() {
        return Some("पासवर्ड आवश्यक आहे / Password is required".to_string());
    }
    if password.chars().count() < 6 {
        return Some("पासवर्ड किमान 6 अक्षरांचा हवा / Password must be at least 6 characters".to_string());
    }
    if password != confirm {
        return Some("पासवर्ड जुळत नाहीत / Passwords do not match".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name}: आवश्यक आहे / is required"));
    }
    validate_optional(trimmed, field_name, max_len)
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    if value.trim().chars().count() > max_len {
        return Some(format!("{field_name}: जास्तीत जास्त {max_len} अक्षरे / must be at most {max_len} characters"));
    }
    None
}
