use crate::client::ClientOptions;
use crate::forms::FillProfile;
use serde::Deserialize;

/// Main configuration structure for Sumi-Formfill
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Crawl client settings
    #[serde(default)]
    pub client: ClientOptions,

    /// Overrides for the form fill profile
    #[serde(default, rename = "form-fill")]
    pub form_fill: FormFillConfig,
}

/// Form fill profile overrides; unset keys keep the built-in defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFillConfig {
    pub email: Option<String>,
    pub color: Option<String>,
    pub password: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    pub placeholder: Option<String>,
}

impl FormFillConfig {
    /// Builds the fill profile: defaults first, then every configured override
    pub fn to_profile(&self) -> FillProfile {
        let mut profile = FillProfile::default();
        let overrides = [
            (&mut profile.email, &self.email),
            (&mut profile.color, &self.color),
            (&mut profile.password, &self.password),
            (&mut profile.phone_number, &self.phone),
            (&mut profile.placeholder, &self.placeholder),
        ];
        for (slot, value) in overrides {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
        profile
    }
}
