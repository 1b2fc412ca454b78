use uuid::Uuid;

/// Domain appended to the generated default e-mail address
pub const DEFAULT_EMAIL_DOMAIN: &str = "katanacrawler.io";

/// Default values used when a field carries nothing to infer from
///
/// Built once at startup (defaults, then configuration overrides) and shared
/// read-only afterwards, usually behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillProfile {
    pub email: String,
    pub color: String,
    pub password: String,
    pub phone_number: String,
    pub placeholder: String,
}

impl Default for FillProfile {
    /// Built-in defaults. The e-mail local part is a fresh UUID, so two calls
    /// yield different addresses.
    fn default() -> Self {
        Self {
            email: format!("{}@{}", Uuid::new_v4().simple(), DEFAULT_EMAIL_DOMAIN),
            color: "#e66465".to_string(),
            password: "katanaP@assw0rd1".to_string(),
            phone_number: "2124567890".to_string(),
            placeholder: "katana".to_string(),
        }
    }
}
