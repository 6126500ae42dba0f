//! Built-in template compiler.
//!
//! Turns `<template>` markup into an ES module that exports
//! `render(_ctx, _cache)`. The render function builds vnodes with Vue's
//! runtime `h`, so the module only needs the runtime helpers imported from
//! `"vue"`.
//!
//! Supported: elements, text, `{{ }}` interpolation, static attributes,
//! `:attr` / `v-bind`, `@event` / `v-on`, `v-html`, `v-text` and components
//! resolved by name. Structural directives (`v-if`, `v-for`, slots, ...)
//! need a real compiler and are rejected with
//! [`CompileError::UnsupportedDirective`].

use std::fmt::Debug;

use memchr::memmem;

use super::markup::{find_closing_angle, parse_attributes, tag_name_end, Attribute};

/// Compiles template markup into a render-function module.
pub trait TemplateCompiler: Send + Sync + Debug {
    fn compile(&self, template: &str) -> Result<String, CompileError>;
}

/// Errors from compiling a template.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Element <{tag}> at byte position {position} is never closed")]
    UnclosedTag { tag: String, position: usize },

    #[error("Closing tag </{tag}> at byte position {position} has no matching opening tag")]
    UnexpectedClosingTag { tag: String, position: usize },

    #[error("Expected </{expected}> but found </{found}> at byte position {position}")]
    MismatchedClosingTag {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("Unterminated interpolation starting at byte position {position}")]
    UnterminatedInterpolation { position: usize },

    #[error("Unclosed comment starting at byte position {position}")]
    UnterminatedComment { position: usize },

    #[error("Malformed tag at byte position {position}")]
    MalformedTag { position: usize },

    #[error("Attribute '{attribute}' on <{tag}> needs an expression")]
    EmptyExpression { attribute: String, tag: String },

    /// Directive that requires compile-time control flow
    #[error("Directive '{directive}' on <{tag}> is not supported by the built-in compiler")]
    UnsupportedDirective { directive: String, tag: String },
}

/// Built-in compiler emitting `h()` based render functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderCompiler;

impl TemplateCompiler for RenderCompiler {
    fn compile(&self, template: &str) -> Result<String, CompileError> {
        let nodes = parse(template)?;
        let mut codegen = Codegen::default();
        let body = codegen.root(&nodes)?;
        Ok(codegen.finish(&body))
    }
}

// ============================================================================
// Markup tree
// ============================================================================

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
    Interpolation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    tag: String,
    attrs: Vec<Attribute>,
    children: Vec<Node>,
    position: usize,
}

impl Element {
    fn is_component(&self) -> bool {
        self.tag.starts_with(|c: char| c.is_ascii_uppercase()) || self.tag.contains('-')
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

fn children_of<'a>(stack: &'a mut [Element], root: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(open) => &mut open.children,
        None => root,
    }
}

fn flush_text(text: &mut String, stack: &mut [Element], root: &mut Vec<Node>) {
    if !text.is_empty() {
        let decoded = decode_entities(&std::mem::take(text));
        children_of(stack, root).push(Node::Text(decoded));
    }
}

fn parse(source: &str) -> Result<Vec<Node>, CompileError> {
    let bytes = source.as_bytes();
    let mut root = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(b"{{") {
            let close = memmem::find(&bytes[i + 2..], b"}}")
                .ok_or(CompileError::UnterminatedInterpolation { position: i })?;
            flush_text(&mut text, &mut stack, &mut root);
            let expression = source[i + 2..i + 2 + close].trim().to_string();
            children_of(&mut stack, &mut root).push(Node::Interpolation(expression));
            i += close + 4;
            continue;
        }

        if bytes[i] == b'<' {
            if bytes[i..].starts_with(b"<!--") {
                let close = memmem::find(&bytes[i + 4..], b"-->")
                    .ok_or(CompileError::UnterminatedComment { position: i })?;
                i += close + 7;
                continue;
            }

            if bytes.get(i + 1) == Some(&b'/') {
                let name_end = tag_name_end(bytes, i + 2);
                let name = &source[i + 2..name_end];
                let close = find_closing_angle(bytes, name_end)
                    .ok_or(CompileError::MalformedTag { position: i })?;

                flush_text(&mut text, &mut stack, &mut root);
                let element = stack.pop().ok_or_else(|| CompileError::UnexpectedClosingTag {
                    tag: name.to_string(),
                    position: i,
                })?;
                if element.tag != name {
                    return Err(CompileError::MismatchedClosingTag {
                        expected: element.tag,
                        found: name.to_string(),
                        position: i,
                    });
                }
                children_of(&mut stack, &mut root).push(Node::Element(element));
                i = close + 1;
                continue;
            }

            if bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
                let name_end = tag_name_end(bytes, i + 1);
                let close = find_closing_angle(bytes, name_end)
                    .ok_or(CompileError::MalformedTag { position: i })?;
                let attr_text = &source[name_end..close];

                flush_text(&mut text, &mut stack, &mut root);
                let element = Element {
                    tag: source[i + 1..name_end].to_string(),
                    attrs: parse_attributes(attr_text),
                    children: Vec::new(),
                    position: i,
                };
                if attr_text.trim_end().ends_with('/') || is_void(&element.tag) {
                    children_of(&mut stack, &mut root).push(Node::Element(element));
                } else {
                    stack.push(element);
                }
                i = close + 1;
                continue;
            }
        }

        // Plain text up to the next possible markup
        let next = memchr::memchr2(b'<', b'{', &bytes[i + 1..])
            .map(|pos| i + 1 + pos)
            .unwrap_or(bytes.len());
        text.push_str(&source[i..next]);
        i = next;
    }

    flush_text(&mut text, &mut stack, &mut root);

    match stack.pop() {
        Some(open) => Err(CompileError::UnclosedTag {
            tag: open.tag,
            position: open.position,
        }),
        None => Ok(root),
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

// ============================================================================
// Code generation
// ============================================================================

enum Child<'a> {
    Text(String),
    Interpolation(&'a str),
    Element(&'a Element),
}

struct Rendered {
    code: String,
    is_text: bool,
}

/// Drops layout whitespace and collapses the rest to single spaces.
fn condense(nodes: &[Node]) -> Vec<Child<'_>> {
    let last = nodes.len().saturating_sub(1);
    let is_element = |index: Option<usize>| {
        index
            .and_then(|i| nodes.get(i))
            .is_some_and(|node| matches!(node, Node::Element(_)))
    };

    nodes
        .iter()
        .enumerate()
        .filter_map(|(i, node)| match node {
            Node::Element(element) => Some(Child::Element(element)),
            Node::Interpolation(expression) => Some(Child::Interpolation(expression)),
            Node::Text(text) if text.trim().is_empty() => {
                let between_elements = is_element(i.checked_sub(1)) && is_element(Some(i + 1));
                if i == 0 || i == last || (between_elements && text.contains('\n')) {
                    None
                } else {
                    Some(Child::Text(" ".to_string()))
                }
            }
            Node::Text(text) => Some(Child::Text(collapse_whitespace(text))),
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn array(items: &[String], depth: usize) -> String {
    let indent = "  ".repeat(depth + 1);
    let close = "  ".repeat(depth);
    format!("[\n{indent}{}\n{close}]", items.join(&format!(",\n{indent}")))
}

#[derive(Default)]
struct Codegen {
    uses_h: bool,
    uses_display: bool,
    uses_resolve: bool,
    /// Component tags in order of first use
    components: Vec<String>,
}

impl Codegen {
    fn root(&mut self, nodes: &[Node]) -> Result<String, CompileError> {
        let children = self.children(nodes, 1)?;
        Ok(match children.as_slice() {
            [] => "null".to_string(),
            [only] => only.code.clone(),
            many => array(&many.iter().map(|c| c.code.clone()).collect::<Vec<_>>(), 1),
        })
    }

    fn finish(self, body: &str) -> String {
        let mut imports = Vec::new();
        if self.uses_h {
            imports.push("h as _h");
        }
        if self.uses_display {
            imports.push("toDisplayString as _toDisplayString");
        }
        if self.uses_resolve {
            imports.push("resolveComponent as _resolveComponent");
        }

        let mut out = String::new();
        if !imports.is_empty() {
            out.push_str(&format!("import {{ {} }} from \"vue\"\n\n", imports.join(", ")));
        }
        out.push_str("export function render(_ctx, _cache) {\n");
        for tag in &self.components {
            out.push_str(&format!(
                "  const {} = _resolveComponent({})\n",
                component_var(tag),
                js_string(tag)
            ));
        }
        if !self.components.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("  return {body}\n}}\n"));
        out
    }

    fn children(&mut self, nodes: &[Node], depth: usize) -> Result<Vec<Rendered>, CompileError> {
        let mut rendered = Vec::new();
        let mut text_run: Vec<String> = Vec::new();

        for child in condense(nodes) {
            match child {
                Child::Text(text) => text_run.push(js_string(&text)),
                Child::Interpolation(expression) => {
                    self.uses_display = true;
                    text_run.push(format!("_toDisplayString({})", prefix_identifiers(expression, &[])));
                }
                Child::Element(element) => {
                    if !text_run.is_empty() {
                        rendered.push(Rendered {
                            code: text_run.join(" + "),
                            is_text: true,
                        });
                        text_run.clear();
                    }
                    if element.tag == "template" {
                        // A plain <template> renders its children in place
                        if let Some(attr) = element.attrs.first() {
                            return Err(unsupported(&attr.name, element));
                        }
                        rendered.extend(self.children(&element.children, depth)?);
                    } else {
                        rendered.push(Rendered {
                            code: self.element(element, depth)?,
                            is_text: false,
                        });
                    }
                }
            }
        }

        if !text_run.is_empty() {
            rendered.push(Rendered {
                code: text_run.join(" + "),
                is_text: true,
            });
        }

        Ok(rendered)
    }

    fn element(&mut self, element: &Element, depth: usize) -> Result<String, CompileError> {
        self.uses_h = true;

        let tag = if element.is_component() {
            self.uses_resolve = true;
            if !self.components.contains(&element.tag) {
                self.components.push(element.tag.clone());
            }
            component_var(&element.tag)
        } else {
            js_string(&element.tag)
        };

        let props = self.props(element)?;
        let children = self.children(&element.children, depth + 1)?;

        if children.is_empty() {
            return Ok(match props {
                Some(props) => format!("_h({tag}, {props})"),
                None => format!("_h({tag})"),
            });
        }

        let props = props.unwrap_or_else(|| "null".to_string());
        let codes: Vec<String> = children.iter().map(|c| c.code.clone()).collect();

        let children = match children.as_slice() {
            _ if element.is_component() => {
                format!("{{ default: () => {} }}", array(&codes, depth + 1))
            }
            [only] if only.is_text => only.code.clone(),
            _ => array(&codes, depth + 1),
        };

        Ok(format!("_h({tag}, {props}, {children})"))
    }

    fn props(&mut self, element: &Element) -> Result<Option<String>, CompileError> {
        let mut entries = Vec::new();
        let mut class = Vec::new();
        let mut style = Vec::new();

        for attr in &element.attrs {
            let name = attr.name.as_str();

            if let Some(arg) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
                if arg.contains('.') || arg.starts_with('[') {
                    return Err(unsupported(name, element));
                }
                let expression = prefix_identifiers(expression(attr, element)?, &[]);
                match arg {
                    "class" => class.push(expression),
                    "style" => style.push(expression),
                    _ => entries.push(format!("{}: {expression}", js_string(arg))),
                }
            } else if name == "v-bind" {
                let expression = prefix_identifiers(expression(attr, element)?, &[]);
                entries.push(format!("...({expression})"));
            } else if let Some(event) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:"))
            {
                if event.contains('.') || event.starts_with('[') {
                    return Err(unsupported(name, element));
                }
                let handler = event_handler(expression(attr, element)?);
                entries.push(format!("{}: {handler}", js_string(&event_prop(event))));
            } else if name == "v-html" {
                let expression = prefix_identifiers(expression(attr, element)?, &[]);
                entries.push(format!("innerHTML: {expression}"));
            } else if name == "v-text" {
                self.uses_display = true;
                let expression = prefix_identifiers(expression(attr, element)?, &[]);
                entries.push(format!("textContent: _toDisplayString({expression})"));
            } else if name.starts_with("v-") || name.starts_with('#') {
                return Err(unsupported(name, element));
            } else {
                let value = js_string(&decode_entities(attr.value.as_deref().unwrap_or("")));
                match name {
                    "class" => class.push(value),
                    "style" => style.push(value),
                    _ => entries.push(format!("{}: {value}", js_string(name))),
                }
            }
        }

        for (key, parts) in [("class", class), ("style", style)] {
            match parts.as_slice() {
                [] => {}
                [only] => entries.push(format!("\"{key}\": {only}")),
                many => entries.push(format!("\"{key}\": [{}]", many.join(", "))),
            }
        }

        Ok((!entries.is_empty()).then(|| format!("{{ {} }}", entries.join(", "))))
    }
}

fn unsupported(directive: &str, element: &Element) -> CompileError {
    CompileError::UnsupportedDirective {
        directive: directive.to_string(),
        tag: element.tag.clone(),
    }
}

fn expression<'a>(attr: &'a Attribute, element: &Element) -> Result<&'a str, CompileError> {
    attr.value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CompileError::EmptyExpression {
            attribute: attr.name.clone(),
            tag: element.tag.clone(),
        })
}

fn component_var(tag: &str) -> String {
    let sanitized: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("_component_{sanitized}")
}

/// `click` → `onClick`, `my-event` → `onMyEvent`.
fn event_prop(event: &str) -> String {
    let mut prop = String::from("on");
    let mut upper = true;
    for ch in event.chars() {
        if ch == '-' {
            upper = true;
        } else if upper {
            prop.extend(ch.to_uppercase());
            upper = false;
        } else {
            prop.push(ch);
        }
    }
    prop
}

fn event_handler(value: &str) -> String {
    if is_member_path(value) || is_function_expression(value) {
        prefix_identifiers(value, &[])
    } else if value.contains(';') {
        format!("$event => {{ {} }}", prefix_identifiers(value, &["$event"]))
    } else {
        format!("$event => ({})", prefix_identifiers(value, &["$event"]))
    }
}

fn is_member_path(value: &str) -> bool {
    value.split('.').all(is_identifier)
}

fn is_function_expression(value: &str) -> bool {
    if value.starts_with("function") || value.starts_with("async ") {
        return true;
    }
    let bytes = value.as_bytes();
    let head_end = if bytes.first() == Some(&b'(') {
        match matching_paren(bytes, 0) {
            Some(close) => close + 1,
            None => return false,
        }
    } else {
        identifier_end(bytes, 0)
    };
    head_end > 0 && value[head_end..].trim_start().starts_with("=>")
}

fn is_identifier(value: &str) -> bool {
    let bytes = value.as_bytes();
    !bytes.is_empty() && is_ident_start(bytes[0]) && identifier_end(bytes, 0) == bytes.len()
}

// ============================================================================
// Expression prefixing
// ============================================================================

const GLOBALS: &[&str] = &[
    "Infinity", "undefined", "NaN", "isFinite", "isNaN", "parseFloat", "parseInt", "decodeURI",
    "decodeURIComponent", "encodeURI", "encodeURIComponent", "Math", "Number", "Date", "Array",
    "Object", "Boolean", "String", "RegExp", "Map", "Set", "JSON", "Intl", "BigInt", "console",
    "Error", "Symbol", "Promise",
];

const KEYWORDS: &[&str] = &[
    "true", "false", "null", "this", "typeof", "instanceof", "in", "of", "new", "void", "delete",
    "await", "async", "function", "return", "if", "else", "let", "const", "var", "class", "yield",
    "do", "while", "for", "switch", "case", "break", "continue", "default", "throw", "try",
    "catch", "finally",
];

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$'
}

fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

fn identifier_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && is_ident_char(bytes[end]) {
        end += 1;
    }
    end
}

/// Index just past the escape sequence whose backslash is at `start`.
///
/// The escaped character may be multi-byte; the result is always a char
/// boundary.
fn escape_end(bytes: &[u8], start: usize) -> usize {
    let width = match bytes.get(start + 1) {
        None => 0,
        Some(&lead) if lead >= 0xF0 => 4,
        Some(&lead) if lead >= 0xE0 => 3,
        Some(&lead) if lead >= 0xC0 => 2,
        Some(_) => 1,
    };
    (start + 1 + width).min(bytes.len())
}

/// Index just past a string literal opened at `start`.
fn string_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i = escape_end(bytes, i),
            byte if byte == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index of the `)` matching the `(` at `open`.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = string_end(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Block,
    Group,
    TemplateExpr,
}

/// Prefixes free identifiers of a template expression with `_ctx.`.
///
/// Globals, keywords, property accesses, object keys and arrow function
/// parameters are left alone. Shorthand properties (`{ a }`) are expanded
/// so the key keeps its name.
fn prefix_identifiers(expression: &str, locals: &[&str]) -> String {
    let bytes = expression.as_bytes();
    let mut locals: Vec<String> = locals.iter().map(|s| s.to_string()).collect();
    let mut frames: Vec<Frame> = Vec::new();
    let mut out = String::with_capacity(expression.len() + 16);
    let mut in_template = false;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];

        if in_template {
            match byte {
                b'`' => {
                    in_template = false;
                    out.push('`');
                    i += 1;
                }
                b'\\' => {
                    let end = escape_end(bytes, i);
                    out.push_str(&expression[i..end]);
                    i = end;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    frames.push(Frame::TemplateExpr);
                    in_template = false;
                    out.push_str("${");
                    i += 2;
                }
                _ => {
                    let next = memchr::memchr3(b'`', b'\\', b'$', &bytes[i + 1..])
                        .map(|pos| i + 1 + pos)
                        .unwrap_or(bytes.len());
                    out.push_str(&expression[i..next]);
                    i = next;
                }
            }
            continue;
        }

        match byte {
            b'\'' | b'"' => {
                let end = string_end(bytes, i);
                out.push_str(&expression[i..end]);
                i = end;
            }
            b'`' => {
                in_template = true;
                out.push('`');
                i += 1;
            }
            b'{' => {
                let frame = if out.trim_end().ends_with("=>") {
                    Frame::Block
                } else {
                    Frame::Object
                };
                frames.push(frame);
                out.push('{');
                i += 1;
            }
            b'}' => {
                if frames.pop() == Some(Frame::TemplateExpr) {
                    in_template = true;
                }
                out.push('}');
                i += 1;
            }
            b'(' => {
                let arrow_params = matching_paren(bytes, i)
                    .filter(|&close| expression[close + 1..].trim_start().starts_with("=>"));
                match arrow_params {
                    Some(close) => {
                        let params = &bytes[i..close];
                        let mut j = 0;
                        while j < params.len() {
                            if is_ident_start(params[j]) {
                                let end = identifier_end(params, j);
                                locals.push(expression[i + j..i + end].to_string());
                                j = end;
                            } else {
                                j += 1;
                            }
                        }
                        out.push_str(&expression[i..=close]);
                        i = close + 1;
                    }
                    None => {
                        frames.push(Frame::Group);
                        out.push('(');
                        i += 1;
                    }
                }
            }
            b'[' => {
                frames.push(Frame::Group);
                out.push('[');
                i += 1;
            }
            b')' | b']' => {
                frames.pop();
                out.push(byte as char);
                i += 1;
            }
            b'0'..=b'9' => {
                let mut end = i;
                while end < bytes.len() && (is_ident_char(bytes[end]) || bytes[end] == b'.') {
                    end += 1;
                }
                out.push_str(&expression[i..end]);
                i = end;
            }
            _ if is_ident_start(byte) => {
                let end = identifier_end(bytes, i);
                let ident = &expression[i..end];
                let before = expression[..i].trim_end();
                let after = expression[end..].trim_start();
                let in_object = frames.last() == Some(&Frame::Object)
                    && (before.ends_with('{') || before.ends_with(','));

                if before.ends_with('.') && !before.ends_with("...") {
                    out.push_str(ident);
                } else if after.starts_with("=>") {
                    locals.push(ident.to_string());
                    out.push_str(ident);
                } else if in_object && after.starts_with(':') {
                    out.push_str(ident);
                } else if in_object && (after.starts_with(',') || after.starts_with('}')) {
                    out.push_str(ident);
                    out.push_str(": ");
                    out.push_str(&prefixed(ident, &locals));
                } else {
                    out.push_str(&prefixed(ident, &locals));
                }
                i = end;
            }
            _ => {
                let ch_len = expression[i..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&expression[i..i + ch_len]);
                i += ch_len;
            }
        }
    }

    out
}

fn prefixed(ident: &str, locals: &[String]) -> String {
    if GLOBALS.contains(&ident) || KEYWORDS.contains(&ident) || locals.iter().any(|l| l == ident) {
        ident.to_string()
    } else {
        format!("_ctx.{ident}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> String {
        RenderCompiler.compile(template).unwrap()
    }

    #[test]
    fn test_static_element() {
        let out = compile(r#"<div class="app">Hello</div>"#);
        assert!(out.starts_with("import { h as _h } from \"vue\"\n"));
        assert!(out.contains("export function render(_ctx, _cache) {"));
        assert!(out.contains(r#"return _h("div", { "class": "app" }, "Hello")"#));
    }

    #[test]
    fn test_interpolation() {
        let out = compile("<p>Count: {{ count }}</p>");
        assert!(out.contains("toDisplayString as _toDisplayString"));
        assert!(out.contains(r#"_h("p", null, "Count: " + _toDisplayString(_ctx.count))"#));
    }

    #[test]
    fn test_layout_whitespace_dropped() {
        let out = compile("<div>\n  <span>a</span>\n  <span>b</span>\n</div>");
        assert!(out.contains(r#"_h("span", null, "a")"#));
        assert!(out.contains(r#"_h("span", null, "b")"#));
        assert!(!out.contains(r#"" ""#));
        assert!(!out.contains("\\n"));
    }

    #[test]
    fn test_inline_whitespace_kept() {
        let out = compile("<p>{{ a }} {{ b }}</p>");
        assert!(out.contains(r#"_toDisplayString(_ctx.a) + " " + _toDisplayString(_ctx.b)"#));
    }

    #[test]
    fn test_bindings_and_events() {
        let out = compile(r#"<button :disabled="busy" @click="toggle">Go</button>"#);
        assert!(out.contains(r#""disabled": _ctx.busy"#));
        assert!(out.contains(r#""onClick": _ctx.toggle"#));
    }

    #[test]
    fn test_inline_handlers() {
        let out = compile(r#"<i @click="count++" v-on:my-event="select(item.id, $event)"/>"#);
        assert!(out.contains(r#""onClick": $event => (_ctx.count++)"#));
        assert!(out.contains(r#""onMyEvent": $event => (_ctx.select(_ctx.item.id, $event))"#));
    }

    #[test]
    fn test_arrow_handler_kept() {
        assert_eq!(event_handler("() => open = !open"), "() => _ctx.open = !_ctx.open");
    }

    #[test]
    fn test_prefix_identifiers() {
        assert_eq!(
            prefix_identifiers("a.b + Math.max(c, 1) + 'd' + x?.y", &[]),
            "_ctx.a.b + Math.max(_ctx.c, 1) + 'd' + _ctx.x?.y"
        );
        assert_eq!(
            prefix_identifiers("{ active: isActive, big }", &[]),
            "{ active: _ctx.isActive, big: _ctx.big }"
        );
        assert_eq!(
            prefix_identifiers("items.map(i => i.name)", &[]),
            "_ctx.items.map(i => i.name)"
        );
        assert_eq!(
            prefix_identifiers("(a, b) => a + b + c", &[]),
            "(a, b) => a + b + _ctx.c"
        );
        assert_eq!(
            prefix_identifiers("`${a}-b-${c + 1}`", &[]),
            "`${_ctx.a}-b-${_ctx.c + 1}`"
        );
        assert_eq!(prefix_identifiers("[...list, 1.5]", &[]), "[..._ctx.list, 1.5]");
        assert_eq!(prefix_identifiers("ok ? 'yes' : no", &[]), "_ctx.ok ? 'yes' : _ctx.no");
    }

    #[test]
    fn test_class_and_style_merged() {
        let out = compile(r#"<div class="a" :class="{ on: active }" style="color: red"></div>"#);
        assert!(out.contains(r#""class": ["a", { on: _ctx.active }]"#));
        assert!(out.contains(r#""style": "color: red""#));
    }

    #[test]
    fn test_components_resolved() {
        let out = compile(r#"<div><MyButton label="x"/><my-card>hi</my-card></div>"#);
        assert!(out.contains("resolveComponent as _resolveComponent"));
        assert!(out.contains(r#"const _component_MyButton = _resolveComponent("MyButton")"#));
        assert!(out.contains(r#"const _component_my_card = _resolveComponent("my-card")"#));
        assert!(out.contains(r#"_h(_component_MyButton, { "label": "x" })"#));
        assert!(out.contains("_h(_component_my_card, null, { default: () => ["));
    }

    #[test]
    fn test_multiple_roots() {
        let out = compile("<header/>\n<main/>");
        assert!(out.contains("return [\n    _h(\"header\"),\n    _h(\"main\")\n  ]"));
    }

    #[test]
    fn test_void_elements() {
        let out = compile(r#"<p><img src="a.png"><br>text</p>"#);
        assert!(out.contains(r#"_h("img", { "src": "a.png" })"#));
        assert!(out.contains(r#"_h("br")"#));
    }

    #[test]
    fn test_entities_and_comments() {
        let out = compile("<p>a &amp; b &lt;c&gt; <!-- hidden -->&#65;</p>");
        assert!(out.contains(r#""a & b <c> A""#));
        assert!(!out.contains("hidden"));
    }

    #[test]
    fn test_v_html_and_v_text() {
        let out = compile(r#"<div v-html="raw"></div><span v-text="msg"></span>"#);
        assert!(out.contains("innerHTML: _ctx.raw"));
        assert!(out.contains("textContent: _toDisplayString(_ctx.msg)"));
    }

    #[test]
    fn test_plain_template_flattened() {
        let out = compile("<ul><template><li>a</li></template></ul>");
        assert!(out.contains(r#"_h("li", null, "a")"#));
        assert!(!out.contains("\"template\""));
    }

    #[test]
    fn test_empty_template() {
        let out = compile("  \n ");
        assert!(!out.contains("import"));
        assert!(out.contains("return null"));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            RenderCompiler.compile("<div>"),
            Err(CompileError::UnclosedTag { ref tag, position: 0 }) if tag == "div"
        ));
        assert!(matches!(
            RenderCompiler.compile("</div>"),
            Err(CompileError::UnexpectedClosingTag { .. })
        ));
        assert!(matches!(
            RenderCompiler.compile("<div></span>"),
            Err(CompileError::MismatchedClosingTag { .. })
        ));
        assert!(matches!(
            RenderCompiler.compile("<p>{{ a </p>"),
            Err(CompileError::UnterminatedInterpolation { position: 3 })
        ));
        assert!(matches!(
            RenderCompiler.compile("<!-- x"),
            Err(CompileError::UnterminatedComment { .. })
        ));
        assert!(matches!(
            RenderCompiler.compile(r#"<div :id></div>"#),
            Err(CompileError::EmptyExpression { .. })
        ));
    }

    #[test]
    fn test_unsupported_directives() {
        for template in [
            r#"<div v-if="ok"></div>"#,
            r#"<li v-for="i in items"></li>"#,
            r#"<input v-model="name">"#,
            r#"<button @click.prevent="go"></button>"#,
            r#"<template v-slot:header></template>"#,
        ] {
            assert!(
                matches!(
                    RenderCompiler.compile(template),
                    Err(CompileError::UnsupportedDirective { .. })
                ),
                "{template}"
            );
        }
    }

    #[test]
    fn test_escaped_multibyte_characters() {
        assert_eq!(prefix_identifiers("`\\é${x}`", &[]), "`\\é${_ctx.x}`");
        assert_eq!(prefix_identifiers("'\\é' + y", &[]), "'\\é' + _ctx.y");
        assert_eq!(prefix_identifiers("\"\\日\" + z", &[]), "\"\\日\" + _ctx.z");

        let out = compile("<p>{{ `\\é` }}</p>");
        assert!(out.contains("_toDisplayString(`\\é`)"));
    }

    #[test]
    fn test_trailing_backslash_in_template_literal() {
        assert_eq!(prefix_identifiers("`a\\", &[]), "`a\\");
    }
}
