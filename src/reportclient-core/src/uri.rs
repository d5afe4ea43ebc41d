//! Resource URI construction.
//!
//! A resource URI names a user (`<base><email>`), a database
//! (`<base><email>/<db>`) or a view (`<base><email>/<db>/<view>`). Segments
//! are percent-encoded, then encoded `/` and `\` are rewritten into the
//! service's literal placeholders `(/)` and `(//)` so these characters can
//! appear inside names without acting as path separators.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except ASCII alphanumerics and `-_.` is escaped
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode one path segment or query value; a space becomes `%20`, never `+`
pub fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Rewrite encoded separators into the service's literal placeholders
pub fn replace_special_chars(uri: &str) -> String {
    uri.replace("%2F", "(/)").replace("%5C", "(//)")
}

pub fn user_uri(base_url: &str, email: &str) -> String {
    format!("{}{}", base_url, encode(email))
}

pub fn db_uri(base_url: &str, email: &str, db_name: &str) -> String {
    replace_special_chars(&format!("{}{}/{}", base_url, encode(email), encode(db_name)))
}

pub fn table_uri(base_url: &str, email: &str, db_name: &str, table_name: &str) -> String {
    replace_special_chars(&format!(
        "{}{}/{}/{}",
        base_url,
        encode(email),
        encode(db_name),
        encode(table_name)
    ))
}
