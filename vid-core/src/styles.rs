//! Display styles for requesters and Verified IDs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Logo {
    pub uri: Option<String>,
    pub alt_text: Option<String>,
}

/// How the party asking for a Verified ID presents itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequesterStyle {
    pub name: String,
    pub logo: Option<Logo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerifiedIdStyle {
    pub name: String,
    pub issuer: String,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub description: Option<String>,
    pub logo: Option<Logo>,
}

/// A display definition tagged with a locale.
pub trait Localized {
    fn locale(&self) -> Option<&str>;
}

/// Pick the definition for the first preferred language that has one,
/// falling back to the first definition.
pub fn select_localized<'a, T: Localized>(
    definitions: &'a [T],
    preferred_languages: &[String],
) -> Option<&'a T> {
    preferred_languages
        .iter()
        .find_map(|language| {
            definitions.iter().find(|definition| {
                definition
                    .locale()
                    .is_some_and(|locale| locale.eq_ignore_ascii_case(language))
            })
        })
        .or_else(|| definitions.first())
}
