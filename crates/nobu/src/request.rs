//! Request descriptors and URL classification.
//!
//! A request is classified exactly once into a [`RequestKind`] before any
//! handler runs. Patterns overlap (a component sub-resource request also ends
//! in `.vue`), so they are tested in a fixed priority order and the first
//! match wins.

use std::collections::BTreeMap;
use std::fmt;

use crate::assets::AssetKind;

/// Virtual path prefix under which bare module imports are served.
pub const MODULES_PREFIX: &str = "/@modules/";

/// Extension of single-file components.
pub const COMPONENT_EXTENSION: &str = ".vue";

/// Extensions served as module scripts.
pub const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".mjs"];

/// Query parameter selecting a component section.
pub const SECTION_QUERY_KEY: &str = "type";

/// A decoded HTTP request as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Percent-decoded path, always starting with `/`
    pub path: String,
    /// Percent-decoded query parameters
    pub query: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Create a descriptor for an already-decoded path.
    pub fn new(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            path,
            query: BTreeMap::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Build a descriptor from the raw (still encoded) path and query of a URI.
    ///
    /// `+` in the query decodes to a space. A key without `=` maps to the
    /// empty string, and the first occurrence of a repeated key wins.
    pub fn from_uri_parts(raw_path: &str, raw_query: Option<&str>) -> Self {
        let mut request = Self::new(decode(raw_path));

        for pair in raw_query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(&key.replace('+', " "));
            let value = decode(&value.replace('+', " "));
            request.query.entry(key).or_insert(value);
        }

        request
    }

    /// Look up a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

fn decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
    }
}

/// Section of a single-file component addressed by a sub-resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    Template,
    Style,
    /// Any other `type` value; answered with a 400
    Unknown(String),
}

impl SectionKind {
    /// Parse the value of the `type` query parameter.
    pub fn parse(value: &str) -> Self {
        match value {
            "template" => SectionKind::Template,
            "style" => SectionKind::Style,
            other => SectionKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SectionKind::Template => "template",
            SectionKind::Style => "style",
            SectionKind::Unknown(other) => other,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Virtual path addressing one section of the component at `path`.
///
/// The decomposer emits these paths and [`RequestKind::classify`]
/// recognises them; both sides must go through this function.
pub fn virtual_path(path: &str, section: &SectionKind) -> String {
    format!("{path}?{SECTION_QUERY_KEY}={section}")
}

/// The closed set of things a request can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// `/` - the HTML entry document
    Root,
    /// A JavaScript module on disk
    Script { path: String },
    /// `/@modules/<specifier>` - a package from the dependency root
    BareModule { specifier: String },
    /// `*.vue?type=...` - one section of a component
    ComponentSubresource { path: String, section: SectionKind },
    /// `*.vue` - the synthesized component module
    ComponentDocument { path: String },
    /// Image, media or font file
    StaticAsset { path: String, kind: AssetKind },
    /// Nothing matched
    Unmatched,
}

impl RequestKind {
    /// Classify a request. First match wins.
    pub fn classify(request: &RequestDescriptor) -> Self {
        let path = request.path.as_str();

        if path == "/" {
            return RequestKind::Root;
        }

        if SCRIPT_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return RequestKind::Script {
                path: path.to_string(),
            };
        }

        if let Some(specifier) = path.strip_prefix(MODULES_PREFIX) {
            return RequestKind::BareModule {
                specifier: specifier.to_string(),
            };
        }

        if path.ends_with(COMPONENT_EXTENSION) {
            let section = request
                .query_param(SECTION_QUERY_KEY)
                .filter(|value| !value.is_empty());

            return match section {
                Some(section) => RequestKind::ComponentSubresource {
                    path: path.to_string(),
                    section: SectionKind::parse(section),
                },
                None => RequestKind::ComponentDocument {
                    path: path.to_string(),
                },
            };
        }

        if let Some(kind) = AssetKind::classify(path) {
            return RequestKind::StaticAsset {
                path: path.to_string(),
                kind,
            };
        }

        RequestKind::Unmatched
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RequestKind::Root => "root",
            RequestKind::Script { .. } => "script",
            RequestKind::BareModule { .. } => "bare-module",
            RequestKind::ComponentSubresource { .. } => "component-subresource",
            RequestKind::ComponentDocument { .. } => "component",
            RequestKind::StaticAsset { .. } => "asset",
            RequestKind::Unmatched => "unmatched",
        }
    }
}
