//! Languages command implementation.

use crate::cli::Output;
use crate::collaborators::SUPPORTED_LANGUAGES;

/// Print the languages available for `--translate-to`.
pub fn run_languages() {
    Output::header(&format!("Languages ({})", SUPPORTED_LANGUAGES.len()));
    println!();
    for (name, code) in SUPPORTED_LANGUAGES {
        Output::kv(code, name);
    }
}
