//! Form handling module
//!
//! This module turns HTML form controls into field descriptors and suggests
//! submission values for them:
//! - Field extraction from parsed elements
//! - Value inference from a fill profile
//! - Form discovery and submission shaping
//!
//! # Example
//!
//! ```
//! use sumi_formfill::forms::{discover_forms, encode_suggestions, fill_suggestions, FillProfile};
//!
//! let html = r#"<form action="/login"><input type="email" name="user"></form>"#;
//! let profile = FillProfile::default();
//!
//! for form in discover_forms(html) {
//!     let suggestions = fill_suggestions(&form.fields, &profile);
//!     assert_eq!(suggestions["user"], profile.email);
//!     assert!(encode_suggestions(&suggestions).starts_with("user="));
//! }
//! ```

mod discover;
mod extract;
mod field;
mod fill;
mod profile;
mod submit;

pub use discover::{discover_forms, DiscoveredForm};
pub use extract::extract_field;
pub use field::{FieldDescriptor, FieldKind};
pub use fill::{fill_suggestions, SuggestionMap};
pub use profile::{FillProfile, DEFAULT_EMAIL_DOMAIN};
pub use submit::{build_submission, encode_suggestions};
