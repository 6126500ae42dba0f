//! Request dispatch.
//!
//! [`DevHandler::handle`] classifies a request once and hands it to exactly
//! one handler. Each request is answered from scratch: nothing is cached
//! between requests and a failed request leaves no state behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::content_type;
use crate::paths::safe_join;
use crate::request::{RequestDescriptor, RequestKind, SectionKind};
use crate::resolver::BareModuleResolver;
use crate::rewrite::rewrite_imports;
use crate::runtime::{read_text, NativeRuntime, Runtime};
use crate::sfc::ComponentDecomposer;
use crate::{Error, Result};

/// Content type of every module response.
pub const JAVASCRIPT: &str = "application/javascript";

/// Content type of the entry document.
pub const HTML: &str = "text/html; charset=utf-8";

/// Where the handler reads from.
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    /// Project root; script and component paths resolve against it
    pub root: PathBuf,
    /// Entry document served for `/`, relative to `root`
    pub index: String,
    /// Dependency root, relative to `root` unless absolute
    pub modules_dir: PathBuf,
    /// Directory static assets are served from (defaults to `root`)
    pub asset_dir: Option<PathBuf>,
}

impl HandlerOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: "index.html".to_string(),
            modules_dir: PathBuf::from("node_modules"),
            asset_dir: None,
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_modules_dir(mut self, modules_dir: impl Into<PathBuf>) -> Self {
        self.modules_dir = modules_dir.into();
        self
    }

    pub fn with_asset_dir(mut self, asset_dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(asset_dir.into());
        self
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevResponse {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl DevResponse {
    pub fn javascript(source: String) -> Self {
        Self {
            content_type: JAVASCRIPT,
            body: source.into_bytes(),
        }
    }

    pub fn html(body: Vec<u8>) -> Self {
        Self {
            content_type: HTML,
            body,
        }
    }

    /// Body as text, for logging and tests.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Answers dev server requests.
#[derive(Debug, Clone)]
pub struct DevHandler {
    options: HandlerOptions,
    runtime: Arc<dyn Runtime>,
    resolver: BareModuleResolver,
    decomposer: ComponentDecomposer,
}

impl DevHandler {
    /// Handler reading from the local filesystem.
    pub fn new(options: HandlerOptions) -> Self {
        Self::with_runtime(options, Arc::new(NativeRuntime::new()))
    }

    pub fn with_runtime(options: HandlerOptions, runtime: Arc<dyn Runtime>) -> Self {
        let resolver = BareModuleResolver::new(
            Arc::clone(&runtime),
            options.resolve(&options.modules_dir),
        );
        Self {
            options,
            runtime,
            resolver,
            decomposer: ComponentDecomposer::default(),
        }
    }

    /// Replace the component parser and template compiler.
    pub fn with_decomposer(mut self, decomposer: ComponentDecomposer) -> Self {
        self.decomposer = decomposer;
        self
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    /// Answer one request.
    pub async fn handle(&self, request: &RequestDescriptor) -> Result<DevResponse> {
        let kind = RequestKind::classify(request);
        tracing::debug!(path = %request.path, kind = kind.name(), "classified request");

        let result = self.dispatch(kind, request).await;

        if let Err(err) = &result {
            if err.is_client_error() {
                tracing::warn!(path = %request.path, status = err.status_code(), "{err}");
            } else {
                tracing::error!(path = %request.path, status = err.status_code(), "{err}");
            }
        }

        result
    }

    async fn dispatch(&self, kind: RequestKind, request: &RequestDescriptor) -> Result<DevResponse> {
        match kind {
            RequestKind::Root => {
                let path = safe_join(&self.options.root, &self.options.index)?;
                let body = self.runtime.read_file(&path).await?;
                Ok(DevResponse::html(body))
            }

            RequestKind::Script { path } => {
                let file = safe_join(&self.options.root, &path)?;
                let source = read_text(self.runtime.as_ref(), &file).await?;
                Ok(DevResponse::javascript(rewrite_imports(&source).into_owned()))
            }

            RequestKind::BareModule { specifier } => {
                let source = self.resolver.load(&specifier).await?;
                Ok(DevResponse::javascript(source))
            }

            RequestKind::ComponentSubresource { path, section } => {
                if let SectionKind::Unknown(value) = section {
                    return Err(Error::UnknownSectionType(value));
                }

                let source = self.read_component(&path).await?;
                let module = match section {
                    SectionKind::Template => self.decomposer.template_module(&path, &source)?,
                    _ => self.decomposer.style_module(&path, &source)?,
                };
                Ok(DevResponse::javascript(module))
            }

            RequestKind::ComponentDocument { path } => {
                let source = self.read_component(&path).await?;
                let module = self.decomposer.document_module(&path, &source)?;
                Ok(DevResponse::javascript(module))
            }

            RequestKind::StaticAsset { path, kind } => {
                let base = match &self.options.asset_dir {
                    Some(dir) => self.options.resolve(dir),
                    None => self.options.root.clone(),
                };
                let file = safe_join(&base, &path)?;
                let body = self.runtime.read_file(&file).await?;
                tracing::trace!(path = %path, ?kind, bytes = body.len(), "serving asset");
                Ok(DevResponse {
                    content_type: content_type(&path),
                    body,
                })
            }

            RequestKind::Unmatched => Err(Error::UnroutableRequest(request.path.clone())),
        }
    }

    async fn read_component(&self, path: &str) -> Result<String> {
        let file = safe_join(&self.options.root, path)?;
        read_text(self.runtime.as_ref(), &file).await
    }
}
