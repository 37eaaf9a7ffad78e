use once_cell::sync::Lazy;
use regex::Regex;

static TRAILER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9a-zA-Z.\s]").expect("static trailer pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

const EXPORT_PREFIX: &str = "Player stats ";

/// Player name from a match-history source identifier such as
/// `"Player stats  L. Messi (2)"`.
pub fn display_name_from_source(source: &str) -> String {
    let head = TRAILER.split(source).next().unwrap_or_default();
    let collapsed = WHITESPACE.replace_all(head, " ");
    collapsed.replace(EXPORT_PREFIX, "").trim().to_string()
}
