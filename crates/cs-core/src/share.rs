//! # Share Addressing
//!
//! The entire wire protocol of the system: a path of the shape
//! `/capsule/<username>/<url-encoded title>` naming a capsule by its
//! `(username, title)` key.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters a JS `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A shared, read-only view of somebody's capsule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTarget {
    pub username: String,
    pub title: String,
}

/// Parses a location path into a share target. The title segment is
/// everything after the second slash, slashes included, percent-decoded.
/// Anything that is not a capsule path yields `None`.
pub fn parse_capsule_path(path: &str) -> Option<ShareTarget> {
    let rest = path.strip_prefix("/capsule/")?;
    let (username, encoded_title) = rest.split_once('/')?;
    if username.is_empty() || encoded_title.is_empty() {
        return None;
    }
    let title = percent_decode_str(encoded_title).decode_utf8().ok()?.into_owned();
    Some(ShareTarget {
        username: username.to_string(),
        title,
    })
}

/// Builds the shareable path for a capsule.
pub fn capsule_path(username: &str, title: &str) -> String {
    format!("/capsule/{}/{}", username, utf8_percent_encode(title, COMPONENT))
}
