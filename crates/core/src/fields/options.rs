#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Options shared by the text-like kinds (text, textarea, email, url, phone).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextOptions {
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
}

/// Options for number and slider kinds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberOptions {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step: Option<f64>,
}

/// Options for the choice kinds (select, multiselect, radio).
///
/// `allow_other` opens a free-text "Other" entry; only the multiselect
/// renderer honors it, single-choice kinds stay closed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoiceOptions {
    pub choices: Vec<String>,
    pub allow_other: bool,
}

/// Bounds for date, time and datetime kinds. The bound strings use the same
/// input format as the answer value for the kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateOptions {
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub default_today: bool,
}

/// Options for file and image kinds. `allowed_types` entries are filename
/// suffixes (".pdf") or MIME patterns ("image/png").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileOptions {
    pub max_file_size: Option<u64>,
    pub allow_multiple_files: bool,
    pub allowed_types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RatingOptions {
    pub max_rating: u8,
    pub allow_half_stars: bool,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            max_rating: 5,
            allow_half_stars: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfoOptions {
    pub info_text: String,
}

/// Options for the inspection kind (Pass/Fail/Flag checkpoints).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectionOptions {
    pub allow_comments: bool,
    pub require_comment_on_fail: bool,
}
