use serde::{Deserialize, Serialize};

/// Knobs for a single stripping pass.
///
/// The default strips every block comment completely, delimiters and line
/// breaks included.
///
/// # Examples
///
/// ```
/// use sqlstrip_core::{StripOptions, strip_comments_with};
///
/// let options = StripOptions::preserving_line_breaks();
/// let (out, _) = strip_comments_with("a /* one\ntwo */ b", &options);
/// assert_eq!(out, "a \n b");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripOptions {
    /// Keep `\n` and `\r` characters found inside comments so that line
    /// numbers in the output match the source.
    #[serde(default)]
    pub preserve_line_breaks: bool,
}

impl StripOptions {
    /// Options that keep line breaks from inside comments.
    pub fn preserving_line_breaks() -> Self {
        Self {
            preserve_line_breaks: true,
        }
    }
}
