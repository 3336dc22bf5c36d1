//! Type and text predicates over HAR entries.

use crate::format::extract_path;
use crate::har::HarEntry;

/// Resource tags with their own filter category. Anything outside this set
/// falls into `Other`.
const KNOWN_TAGS: [&str; 11] = [
    "xhr",
    "fetch",
    "stylesheet",
    "script",
    "font",
    "image",
    "media",
    "manifest",
    "websocket",
    "wasm",
    "document",
];

/// Type filter over the normalized resource-type tag. Two synthetic
/// categories: `FetchXhr` merges the two request styles, `Other` catches any
/// tag outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    FetchXhr,
    Document,
    Stylesheet,
    Script,
    Font,
    Image,
    Media,
    Manifest,
    Websocket,
    Wasm,
    Other,
}

impl TypeFilter {
    pub fn matches(self, entry: &HarEntry) -> bool {
        let tag = entry.resource_tag();
        match self {
            TypeFilter::All => true,
            TypeFilter::FetchXhr => tag == "xhr" || tag == "fetch",
            TypeFilter::Other => !KNOWN_TAGS.contains(&tag.as_str()),
            TypeFilter::Document => tag == "document",
            TypeFilter::Stylesheet => tag == "stylesheet",
            TypeFilter::Script => tag == "script",
            TypeFilter::Font => tag == "font",
            TypeFilter::Image => tag == "image",
            TypeFilter::Media => tag == "media",
            TypeFilter::Manifest => tag == "manifest",
            TypeFilter::Websocket => tag == "websocket",
            TypeFilter::Wasm => tag == "wasm",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::FetchXhr => "fetch_xhr",
            TypeFilter::Document => "document",
            TypeFilter::Stylesheet => "stylesheet",
            TypeFilter::Script => "script",
            TypeFilter::Font => "font",
            TypeFilter::Image => "image",
            TypeFilter::Media => "media",
            TypeFilter::Manifest => "manifest",
            TypeFilter::Websocket => "websocket",
            TypeFilter::Wasm => "wasm",
            TypeFilter::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(TypeFilter::All),
            "fetch_xhr" | "fetch-xhr" | "xhr" | "fetch" => Some(TypeFilter::FetchXhr),
            "document" | "doc" => Some(TypeFilter::Document),
            "stylesheet" | "css" => Some(TypeFilter::Stylesheet),
            "script" | "js" => Some(TypeFilter::Script),
            "font" => Some(TypeFilter::Font),
            "image" | "img" => Some(TypeFilter::Image),
            "media" => Some(TypeFilter::Media),
            "manifest" => Some(TypeFilter::Manifest),
            "websocket" | "ws" => Some(TypeFilter::Websocket),
            "wasm" => Some(TypeFilter::Wasm),
            "other" => Some(TypeFilter::Other),
            _ => None,
        }
    }
}

/// Case-insensitive substring match against path+query of the request URL.
/// An empty (or whitespace-only) query matches everything.
pub fn matches_text(entry: &HarEntry, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    extract_path(entry.url()).to_lowercase().contains(&query)
}

/// Short display label for an entry's resource type.
pub fn type_label(entry: &HarEntry) -> String {
    let tag = entry.resource_tag();
    match tag.as_str() {
        "xhr" => "XHR".to_string(),
        "fetch" => "Fetch".to_string(),
        "script" => "JS".to_string(),
        "stylesheet" => "CSS".to_string(),
        "font" => "Font".to_string(),
        "image" => "Img".to_string(),
        "media" => "Media".to_string(),
        "manifest" => "Manifest".to_string(),
        "websocket" => "WS".to_string(),
        "wasm" => "WASM".to_string(),
        "document" => "Doc".to_string(),
        other => {
            let upper = other.to_ascii_uppercase();
            upper.chars().take(5).collect()
        }
    }
}
