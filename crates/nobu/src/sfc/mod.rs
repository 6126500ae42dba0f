//! Single-file component support.
//!
//! A `.vue` file is served as three independently fetchable modules:
//!
//! ```text
//! /App.vue               → script + imports of the two below
//! /App.vue?type=template → render function compiled from <template>
//! /App.vue?type=style    → injects the first <style> into document.head
//! ```
//!
//! Parsing and template compilation sit behind the [`ComponentParser`] and
//! [`TemplateCompiler`] traits; [`VueParser`] and [`RenderCompiler`] are the
//! built-in implementations.

mod compiler;
mod decompose;
mod markup;
mod parser;

pub use compiler::{CompileError, RenderCompiler, TemplateCompiler};
pub use decompose::{
    style_module, ComponentDecomposer, UPDATE_STYLE_RUNTIME, UPDATE_STYLE_RUNTIME_VERSION,
};
pub use markup::Attribute;
pub use parser::{Block, ComponentDocument, ComponentParser, ParseError, VueParser};

/// Maximum component file size in bytes (10 MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
