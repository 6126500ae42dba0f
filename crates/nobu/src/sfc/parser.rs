//! Component parser: splits a `.vue` file into its top-level blocks.

use std::collections::BTreeMap;
use std::fmt::Debug;

use memchr::memmem;

use super::markup::{find_closing_angle, find_closing_tag, parse_attributes, tag_name_end};
use super::MAX_FILE_SIZE;

/// One top-level block of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Text between the opening and closing tag
    pub content: String,
    /// Attributes of the opening tag
    pub attrs: BTreeMap<String, Option<String>>,
    /// Byte offset of `content` in the component source
    pub offset: usize,
}

impl Block {
    /// Value of the `lang` attribute, if any.
    pub fn lang(&self) -> Option<&str> {
        self.attrs.get("lang").and_then(|value| value.as_deref())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

/// A component split into its sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDocument {
    pub script: Option<Block>,
    pub template: Option<Block>,
    /// Style blocks in source order
    pub styles: Vec<Block>,
}

/// Errors from parsing a component.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// File exceeds maximum allowed size
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    /// A block was opened but never closed
    #[error("Unclosed <{tag}> starting at byte position {position}")]
    UnclosedBlock { tag: String, position: usize },

    /// A second <script> or <template> block
    #[error("Duplicate <{tag}> block at byte position {position}")]
    DuplicateBlock { tag: String, position: usize },

    /// HTML comment opened but never closed
    #[error("Unclosed comment starting at byte position {position}")]
    UnclosedComment { position: usize },
}

/// Splits component source text into sections.
pub trait ComponentParser: Send + Sync + Debug {
    fn parse(&self, source: &str) -> Result<ComponentDocument, ParseError>;
}

/// Built-in parser for Vue single-file components.
///
/// Recognises top-level `<script>`, `<template>` and `<style>` blocks.
/// Custom blocks and comments between them are skipped. Nested
/// `<template>` tags inside the template block are balanced.
#[derive(Debug, Clone, Copy, Default)]
pub struct VueParser;

impl ComponentParser for VueParser {
    fn parse(&self, source: &str) -> Result<ComponentDocument, ParseError> {
        if source.len() > MAX_FILE_SIZE {
            return Err(ParseError::FileTooLarge {
                size: source.len(),
                max: MAX_FILE_SIZE,
            });
        }

        let bytes = source.as_bytes();
        let mut document = ComponentDocument::default();
        let mut pointer = 0;

        while let Some(pos) = memchr::memchr(b'<', &bytes[pointer..]) {
            let start = pointer + pos;

            if bytes[start..].starts_with(b"<!--") {
                let end = memmem::find(&bytes[start + 4..], b"-->")
                    .ok_or(ParseError::UnclosedComment { position: start })?;
                pointer = start + 4 + end + 3;
                continue;
            }

            let name_end = tag_name_end(bytes, start + 1);
            let name = &source[start + 1..name_end];

            if name.is_empty() || name.starts_with('/') || name.starts_with('!') {
                pointer = start + 1;
                continue;
            }

            let (block, next) = parse_block(source, start, name)?;
            pointer = next;

            match name {
                "script" => {
                    if document.script.is_some() {
                        return Err(duplicate(name, start));
                    }
                    document.script = Some(block);
                }
                "template" => {
                    if document.template.is_some() {
                        return Err(duplicate(name, start));
                    }
                    document.template = Some(block);
                }
                "style" => document.styles.push(block),
                _ => {}
            }
        }

        Ok(document)
    }
}

fn duplicate(tag: &str, position: usize) -> ParseError {
    ParseError::DuplicateBlock {
        tag: tag.to_string(),
        position,
    }
}

fn unclosed(tag: &str, position: usize) -> ParseError {
    ParseError::UnclosedBlock {
        tag: tag.to_string(),
        position,
    }
}

/// Parses the block whose opening tag starts at `start`.
///
/// Returns the block and the byte index just past its closing tag.
fn parse_block(source: &str, start: usize, name: &str) -> Result<(Block, usize), ParseError> {
    let bytes = source.as_bytes();
    let name_end = start + 1 + name.len();

    let tag_end = find_closing_angle(bytes, name_end).ok_or_else(|| unclosed(name, start))?;
    let attr_text = &source[name_end..tag_end];
    let attrs = parse_attributes(attr_text)
        .into_iter()
        .map(|attr| (attr.name, attr.value))
        .collect();

    if attr_text.trim_end().ends_with('/') {
        let block = Block {
            content: String::new(),
            attrs,
            offset: tag_end + 1,
        };
        return Ok((block, tag_end + 1));
    }

    let content_start = tag_end + 1;
    let (content_end, next) = if name == "template" {
        find_balanced_template_end(bytes, content_start)
    } else {
        find_closing_tag(bytes, content_start, name)
    }
    .ok_or_else(|| unclosed(name, start))?;

    let block = Block {
        content: source[content_start..content_end].to_string(),
        attrs,
        offset: content_start,
    };
    Ok((block, next))
}

/// Finds the `</template>` matching an already-open `<template>`.
fn find_balanced_template_end(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let open_finder = memmem::Finder::new(b"<template");
    let mut depth = 1usize;
    let mut cursor = start;

    loop {
        let (close_start, close_end) = find_closing_tag(bytes, cursor, "template")?;

        // Count nested openings before this closing tag
        let mut scan = cursor;
        while let Some(pos) = open_finder.find(&bytes[scan..close_start]) {
            let open = scan + pos;
            let after = open + b"<template".len();
            scan = after;

            if after < bytes.len() && super::markup::is_tag_boundary(bytes[after]) {
                let self_closing = find_closing_angle(bytes, after)
                    .is_some_and(|end| end > 0 && bytes[end - 1] == b'/');
                if !self_closing {
                    depth += 1;
                }
            }
        }

        depth -= 1;
        if depth == 0 {
            return Some((close_start, close_end));
        }
        cursor = close_end;
    }
}
