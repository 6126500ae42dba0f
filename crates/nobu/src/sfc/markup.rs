//! Byte-level markup scanning shared by the component parser and the
//! template compiler.
//!
//! Uses memchr rather than regex: the input is untrusted and these helpers
//! run on every component request.

use memchr::memmem;

/// One attribute of an opening tag, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// `None` for bare attributes such as `scoped`
    pub value: Option<String>,
}

/// Whether a byte may follow a tag name.
pub(crate) fn is_tag_boundary(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
}

/// Byte index just past the tag name starting at `start`.
pub(crate) fn tag_name_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && !is_tag_boundary(bytes[end]) {
        end += 1;
    }
    end
}

/// Finds the closing `>` of a tag, handling quoted attributes.
pub(crate) fn find_closing_angle(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;

    for (i, &byte) in bytes[start..].iter().enumerate() {
        match (quote, byte) {
            (None, b'"' | b'\'') => quote = Some(byte),
            (Some(open), _) if byte == open => quote = None,
            (None, b'>') => return Some(start + i),
            _ => {}
        }
    }

    None
}

/// Finds the next `</name>` at or after `start`.
///
/// Returns the byte range of the whole closing tag. Whitespace is allowed
/// between the name and `>`.
pub(crate) fn find_closing_tag(bytes: &[u8], start: usize, name: &str) -> Option<(usize, usize)> {
    let needle = format!("</{name}");
    let finder = memmem::Finder::new(needle.as_bytes());
    let mut from = start;

    while let Some(pos) = finder.find(&bytes[from..]) {
        let open = from + pos;
        let mut cursor = open + needle.len();
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor < bytes.len() && bytes[cursor] == b'>' {
            return Some((open, cursor + 1));
        }
        from = open + needle.len();
    }

    None
}

/// Parses the attribute text between a tag name and its closing `>`.
pub(crate) fn parse_attributes(source: &str) -> Vec<Attribute> {
    let bytes = source.as_bytes();
    let mut attributes = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'/' | b'>')
        {
            i += 1;
        }
        let name = source[name_start..i].to_string();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        if i >= bytes.len() || bytes[i] != b'=' {
            if !name.is_empty() {
                attributes.push(Attribute { name, value: None });
            } else {
                i += 1;
            }
            continue;
        }

        // Skip '=' and any whitespace before the value
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = if i < bytes.len() && matches!(bytes[i], b'"' | b'\'') {
            let quote = bytes[i];
            let value_start = i + 1;
            let value_end = memchr::memchr(quote, &bytes[value_start..])
                .map(|pos| value_start + pos)
                .unwrap_or(bytes.len());
            i = (value_end + 1).min(bytes.len());
            &source[value_start..value_end]
        } else {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            &source[value_start..i]
        };

        attributes.push(Attribute {
            name,
            value: Some(value.to_string()),
        });
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#" lang="ts" scoped setup id=main data-x='a b'"#);
        assert_eq!(
            attrs,
            vec![
                Attribute { name: "lang".into(), value: Some("ts".into()) },
                Attribute { name: "scoped".into(), value: None },
                Attribute { name: "setup".into(), value: None },
                Attribute { name: "id".into(), value: Some("main".into()) },
                Attribute { name: "data-x".into(), value: Some("a b".into()) },
            ]
        );
    }

    #[test]
    fn test_directive_attribute_names() {
        let attrs = parse_attributes(r#":class="{ active: on }" @click="toggle" v-on:input = "set""#);
        let names: Vec<_> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec![":class", "@click", "v-on:input"]);
        assert_eq!(attrs[0].value.as_deref(), Some("{ active: on }"));
        assert_eq!(attrs[2].value.as_deref(), Some("set"));
    }

    #[test]
    fn test_self_closing_slash_ignored() {
        let attrs = parse_attributes(r#" src="a.png" /"#);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_find_closing_angle_skips_quoted() {
        let bytes = br#"<div title="a > b">"#;
        assert_eq!(find_closing_angle(bytes, 4), Some(bytes.len() - 1));
    }

    #[test]
    fn test_find_closing_tag() {
        let bytes = b"body { } </style  > tail";
        let (start, end) = find_closing_tag(bytes, 0, "style").unwrap();
        assert_eq!(&bytes[start..end], b"</style  >");
        assert!(find_closing_tag(b"</styles>", 0, "style").is_none());
    }
}
