//! Component decomposition into independently fetchable modules.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use super::compiler::{RenderCompiler, TemplateCompiler};
use super::parser::{ComponentDocument, ComponentParser, VueParser};
use crate::request::{virtual_path, SectionKind};
use crate::rewrite::rewrite_imports;
use crate::{Error, Result};

/// Browser-side routine that appends a `<style>` element to `document.head`.
///
/// Emitted verbatim at the top of every style sub-resource.
pub const UPDATE_STYLE_RUNTIME: &str = include_str!("../../assets/update-style.js");

/// Bumped whenever [`UPDATE_STYLE_RUNTIME`] changes behavior.
pub const UPDATE_STYLE_RUNTIME_VERSION: u32 = 1;

/// Local binding the component's default export is renamed to.
const SCRIPT_BINDING: &str = "__script";

static DEFAULT_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+default\b\s*").expect("valid export regex"));

/// Build the style sub-resource module for one block of CSS.
///
/// The CSS is embedded as a JSON string literal. `</` is escaped so the
/// payload can never close an enclosing `<script>` element.
pub fn style_module(css: &str) -> String {
    let payload = serde_json::Value::from(css).to_string().replace("</", "<\\/");
    format!("{UPDATE_STYLE_RUNTIME}const __css = {payload};\nupdateStyle(__css);\nexport default __css;\n")
}

/// Splits components into the whole-document, template and style modules.
#[derive(Debug, Clone)]
pub struct ComponentDecomposer {
    parser: Arc<dyn ComponentParser>,
    compiler: Arc<dyn TemplateCompiler>,
}

impl Default for ComponentDecomposer {
    fn default() -> Self {
        Self::vue()
    }
}

impl ComponentDecomposer {
    pub fn new(parser: Arc<dyn ComponentParser>, compiler: Arc<dyn TemplateCompiler>) -> Self {
        Self { parser, compiler }
    }

    /// Decomposer using the built-in [`VueParser`] and [`RenderCompiler`].
    pub fn vue() -> Self {
        Self::new(Arc::new(VueParser), Arc::new(RenderCompiler))
    }

    /// Parse component source, attributing failures to `path`.
    pub fn parse(&self, path: &str, source: &str) -> Result<ComponentDocument> {
        self.parser
            .parse(source)
            .map_err(|source| Error::ComponentParseFailure {
                path: path.to_string(),
                source,
            })
    }

    /// Synthesize the module served for the component itself.
    ///
    /// The script's default export is rebound to a local so the render
    /// function can be attached before it is re-exported. Sub-resource
    /// imports are only emitted for sections that exist, so the browser
    /// never follows an import that would 404.
    pub fn document_module(&self, path: &str, source: &str) -> Result<String> {
        let document = self.parse(path, source)?;

        let script = document
            .script
            .as_ref()
            .map(|block| block.content.as_str())
            .filter(|content| DEFAULT_EXPORT.is_match(content));

        let mut module = match script {
            Some(content) => {
                let bound = DEFAULT_EXPORT.replace(content, format!("const {SCRIPT_BINDING} = "));
                rewrite_imports(&bound).into_owned()
            }
            None => {
                let mut module = document
                    .script
                    .as_ref()
                    .map(|block| rewrite_imports(&block.content).into_owned())
                    .unwrap_or_default();
                module.push_str(&format!("\nconst {SCRIPT_BINDING} = {{}}"));
                module
            }
        };

        if !module.ends_with('\n') {
            module.push('\n');
        }

        if document.template.is_some() {
            let template = js_path(&virtual_path(path, &SectionKind::Template));
            module.push_str(&format!("import {{ render as __render }} from {template}\n"));
        }

        if !document.styles.is_empty() {
            let style = js_path(&virtual_path(path, &SectionKind::Style));
            module.push_str(&format!("import {style}\n"));
        }

        if document.template.is_some() {
            module.push_str(&format!("{SCRIPT_BINDING}.render = __render\n"));
        }

        module.push_str(&format!("export default {SCRIPT_BINDING}\n"));
        Ok(module)
    }

    /// Compile the template section into a render-function module.
    pub fn template_module(&self, path: &str, source: &str) -> Result<String> {
        let document = self.parse(path, source)?;
        let template = document.template.ok_or_else(|| Error::MissingSection {
            path: path.to_string(),
            section: "template",
        })?;

        let compiled = self
            .compiler
            .compile(&template.content)
            .map_err(|source| Error::TemplateCompileFailure {
                path: path.to_string(),
                source,
            })?;

        Ok(rewrite_imports(&compiled).into_owned())
    }

    /// Build the style-injection module from the first style section.
    pub fn style_module(&self, path: &str, source: &str) -> Result<String> {
        let document = self.parse(path, source)?;

        let first = document.styles.first().ok_or_else(|| Error::MissingSection {
            path: path.to_string(),
            section: "style",
        })?;

        if document.styles.len() > 1 {
            tracing::debug!(
                path,
                ignored = document.styles.len() - 1,
                "only the first <style> block is served"
            );
        }

        Ok(style_module(&first.content))
    }
}

fn js_path(path: &str) -> String {
    serde_json::Value::from(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfc::{CompileError, ParseError};

    const APP: &str = r#"<template>
  <div class="app">{{ msg }}</div>
</template>

<script>
import { ref } from 'vue'
import Child from './Child.vue'
export default {
  data() { return { msg: 'hi' } }
}
</script>

<style>
.app { color: red }
</style>
"#;

    #[test]
    fn test_document_module() {
        let module = ComponentDecomposer::vue().document_module("/App.vue", APP).unwrap();

        assert!(module.contains("import { ref } from '/@modules/vue'"));
        assert!(module.contains("import Child from './Child.vue'"));
        assert!(module.contains("const __script = {"));
        assert!(!module.contains("export default {"));
        assert!(module.contains("import { render as __render } from \"/App.vue?type=template\"\n"));
        assert!(module.contains("import \"/App.vue?type=style\"\n"));
        assert!(module.contains("__script.render = __render\n"));
        assert!(module.ends_with("export default __script\n"));
    }

    #[test]
    fn test_no_styles_means_no_style_import() {
        let source = "<template><p/></template><script>export default {}</script>";
        let module = ComponentDecomposer::vue().document_module("/A.vue", source).unwrap();
        assert!(!module.contains("type=style"));
        assert!(module.contains("type=template"));
    }

    #[test]
    fn test_two_styles_import_once_and_serve_first() {
        let source = "<template><p/></template><script>export default {}</script>\
                      <style>.first{}</style><style>.second{}</style>";
        let decomposer = ComponentDecomposer::vue();

        let module = decomposer.document_module("/A.vue", source).unwrap();
        assert_eq!(module.matches("/A.vue?type=style").count(), 1);

        let style = decomposer.style_module("/A.vue", source).unwrap();
        assert!(style.contains(".first{}"));
        assert!(!style.contains(".second{}"));
    }

    #[test]
    fn test_script_without_default_export() {
        let source = "<template><p/></template><script>console.log('side effect')</script>";
        let module = ComponentDecomposer::vue().document_module("/A.vue", source).unwrap();
        assert!(module.starts_with("console.log('side effect')"));
        assert!(module.contains("const __script = {}"));
        assert!(module.ends_with("export default __script\n"));
    }

    #[test]
    fn test_no_script_no_template() {
        let module = ComponentDecomposer::vue()
            .document_module("/Empty.vue", "<style>a{}</style>")
            .unwrap();
        assert!(module.contains("const __script = {}"));
        assert!(!module.contains("__render"));
        assert!(module.contains("import \"/Empty.vue?type=style\""));
    }

    #[test]
    fn test_only_first_default_export_rebound() {
        let source = "<script>export default { a: 1 }\n// export default later</script>";
        let module = ComponentDecomposer::vue().document_module("/A.vue", source).unwrap();
        assert!(module.contains("const __script = { a: 1 }"));
        assert!(module.contains("// export default later"));
    }

    #[test]
    fn test_default_export_without_space() {
        let source = "<template><p/></template><script>export default{ data(){ return {} } }</script>";
        let module = ComponentDecomposer::vue().document_module("/A.vue", source).unwrap();
        assert_eq!(module.matches("export default").count(), 1);
        assert!(module.starts_with("const __script = { data(){ return {} } }"));
        assert!(!module.contains("const __script = {}"));
    }

    #[test]
    fn test_default_export_identifier() {
        let source = "<script>const Comp = {}\nexport default Comp</script>";
        let module = ComponentDecomposer::vue().document_module("/A.vue", source).unwrap();
        assert!(module.contains("const __script = Comp"));
        assert_eq!(module.matches("export default").count(), 1);
    }

    #[test]
    fn test_template_module_rewrites_vue_import() {
        let module = ComponentDecomposer::vue().template_module("/App.vue", APP).unwrap();
        assert!(module.contains("from \"/@modules/vue\""));
        assert!(module.contains("export function render(_ctx, _cache)"));
        assert!(module.contains("_toDisplayString(_ctx.msg)"));
    }

    #[test]
    fn test_missing_sections() {
        let decomposer = ComponentDecomposer::vue();
        let source = "<script>export default {}</script>";

        let err = decomposer.template_module("/A.vue", source).unwrap_err();
        assert!(matches!(err, Error::MissingSection { section: "template", .. }));
        assert_eq!(err.status_code(), 404);

        let err = decomposer.style_module("/A.vue", source).unwrap_err();
        assert!(matches!(err, Error::MissingSection { section: "style", .. }));
    }

    #[test]
    fn test_style_module_shape() {
        let module = style_module(".a { content: \"x\" }\n</style>");
        assert!(module.starts_with(UPDATE_STYLE_RUNTIME));
        assert!(module.contains(r#"const __css = ".a { content: \"x\" }\n<\/style>";"#));
        assert!(module.contains("updateStyle(__css);\n"));
        assert!(module.ends_with("export default __css;\n"));
        assert!(UPDATE_STYLE_RUNTIME.contains("function updateStyle(content)"));
    }

    #[test]
    fn test_parse_failure_carries_path() {
        let err = ComponentDecomposer::vue()
            .document_module("/Broken.vue", "<template><div>")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ComponentParseFailure { ref path, source: ParseError::UnclosedBlock { .. } }
                if path == "/Broken.vue"
        ));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_compile_failure() {
        let err = ComponentDecomposer::vue()
            .template_module("/A.vue", "<template><div v-if=\"x\"></div></template>")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TemplateCompileFailure { source: CompileError::UnsupportedDirective { .. }, .. }
        ));
    }

    #[derive(Debug)]
    struct UppercaseCompiler;

    impl TemplateCompiler for UppercaseCompiler {
        fn compile(&self, template: &str) -> std::result::Result<String, CompileError> {
            Ok(format!("import {{ x }} from 'vue'\nexport const render = {:?}", template.to_uppercase()))
        }
    }

    #[test]
    fn test_custom_compiler() {
        let decomposer = ComponentDecomposer::new(Arc::new(VueParser), Arc::new(UppercaseCompiler));
        let module = decomposer.template_module("/A.vue", "<template>hi</template>").unwrap();
        assert!(module.contains("from '/@modules/vue'"));
        assert!(module.contains("\"HI\""));
    }
}
