//! Conversion between navigable path strings and segment lists.
//!
//! Paths are accepted in a forgiving form (`"/a/b/"`, `"#!a/b"`, `"a//b"`) and
//! normalized into segments. The empty path is the single empty segment `[""]`,
//! which resolves to a root registered with segment `""`.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Bidirectional conversion between paths and segment lists.
pub trait UriHandler: Send + Sync {
    /// Split a raw path into decoded segments.
    fn segments(&self, path: &str) -> Vec<String>;

    /// Join decoded segments into a navigable, encoded path.
    fn path(&self, segments: &[String]) -> String;

    /// Split a fragment into its virtual page and trailing `key=value` parameters.
    fn navigation_state(&self, fragment: &str) -> NavigationState {
        let mut segments = self.segments(fragment);
        let split = segments
            .iter()
            .rposition(|segment| !segment.contains('='))
            .map_or(0, |i| i + 1);
        let parameters = segments
            .split_off(split)
            .into_iter()
            .filter_map(|segment| {
                let (key, value) = segment.split_once('=')?;
                Some((key.to_owned(), value.to_owned()))
            })
            .collect();
        if segments.is_empty() {
            segments.push(String::new());
        }

        NavigationState {
            virtual_page: segments.join("/"),
            parameters,
        }
    }
}

/// A parsed navigation target: page path plus parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Decoded page path without parameters (`""` for the root page).
    pub virtual_page: String,
    /// Parameters taken from trailing `key=value` segments.
    pub parameters: BTreeMap<String, String>,
}

impl NavigationState {
    /// Render back into an encoded fragment using `handler`.
    #[must_use]
    pub fn to_fragment(&self, handler: &dyn UriHandler) -> String {
        let mut segments: Vec<String> = self
            .virtual_page
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        segments.extend(
            self.parameters
                .iter()
                .map(|(key, value)| format!("{key}={value}")),
        );
        handler.path(&segments)
    }
}

/// Default [`UriHandler`].
///
/// Strips an optional `#` / `!` prefix and surrounding slashes, drops empty
/// inner segments, and percent-decodes each segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictUriHandler;

impl UriHandler for StrictUriHandler {
    fn segments(&self, path: &str) -> Vec<String> {
        let trimmed = path
            .trim_start_matches('#')
            .trim_start_matches('!')
            .trim_matches('/');
        if trimmed.is_empty() {
            return vec![String::new()];
        }

        trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
            .collect()
    }

    fn path(&self, segments: &[String]) -> String {
        segments
            .iter()
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}
