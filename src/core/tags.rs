//! Tag addressing: parse user tag specifications into canonical (group, element) pairs.
//!
//! Three shapes are accepted: `(GGGG,EEEE)`, `GGGG,EEEE` (hex, fewer than four
//! digits are left-padded) and bare keywords such as `PatientID`. Resolution is
//! best-effort per fragment: unparsable fragments are logged and skipped.
use std::collections::BTreeSet;
use std::sync::LazyLock;

use dicom::core::Tag;
use dicom::core::dictionary::DataDictionary;
use dicom::dictionary_std::StandardDataDictionary;
use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::io::formatting::format_tag;

static HEX_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\s*\b([0-9A-Fa-f]+)\s*,\s*([0-9A-Fa-f]+)\b\s*\)?").expect("static pattern")
});

static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("static pattern"));

/// Keyword to tag lookups, backed by a data dictionary
pub trait KeywordDictionary: Send + Sync {
    fn keyword_to_tag(&self, keyword: &str) -> Option<Tag>;
    fn tag_to_keyword(&self, tag: Tag) -> Option<String>;
}

impl KeywordDictionary for StandardDataDictionary {
    fn keyword_to_tag(&self, keyword: &str) -> Option<Tag> {
        self.by_name(keyword).map(|entry| entry.tag.inner())
    }

    fn tag_to_keyword(&self, tag: Tag) -> Option<String> {
        self.by_tag(tag).map(|entry| entry.alias.to_string())
    }
}

/// Resolved, deduplicated set of canonical tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|tag| format_tag(*tag)))
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<T: IntoIterator<Item = Tag>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse one hex pair, padding short components.
pub fn parse_hex_pair(group: &str, element: &str) -> Option<Tag> {
    if group.len() > 4 || element.len() > 4 {
        return None;
    }
    let group = u16::from_str_radix(&format!("{group:0>4}"), 16).ok()?;
    let element = u16::from_str_radix(&format!("{element:0>4}"), 16).ok()?;
    Some(Tag(group, element))
}

/// Resolve a tag specification into a set of tags.
///
/// Hex pairs are taken first. When none are present the whole input is read as
/// a comma-separated keyword list. Fragments left over next to hex pairs are
/// tried as keywords too.
pub fn resolve_tags(input: &str, dictionary: &dyn KeywordDictionary) -> TagSet {
    let mut tags = TagSet::new();
    let mut leftover = String::with_capacity(input.len());
    let mut last = 0;
    let mut matched_any = false;

    for captures in HEX_PAIR.captures_iter(input) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        leftover.push_str(&input[last..whole.start()]);
        leftover.push(',');
        last = whole.end();
        matched_any = true;

        let (group, element) = (&captures[1], &captures[2]);
        match parse_hex_pair(group, element) {
            Some(tag) => {
                debug!("Parsed tag: {}", format_tag(tag));
                tags.insert(tag);
            }
            None => warn!("Failed to parse tag ({group},{element}): component exceeds 16 bits"),
        }
    }
    leftover.push_str(&input[last..]);

    let keywords = if matched_any { leftover.as_str() } else { input };
    for fragment in keywords
        .split(|c: char| c == ',' || c == '(' || c == ')' || c.is_whitespace())
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
    {
        if !KEYWORD.is_match(fragment) {
            warn!("Ignoring unparsable tag fragment '{fragment}'");
            continue;
        }
        match dictionary.keyword_to_tag(fragment) {
            Some(tag) => {
                debug!("Parsed keyword '{fragment}' as tag: {}", format_tag(tag));
                tags.insert(tag);
            }
            None => warn!("Failed to parse keyword '{fragment}': not in the data dictionary"),
        }
    }

    tags
}
