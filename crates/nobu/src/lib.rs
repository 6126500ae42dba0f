//! nobu - a no-bundle development server core.
//!
//! Serves an application's source tree to the browser as native ES modules.
//! Every request is classified from its URL alone and answered from scratch:
//!
//! ```text
//! GET /                      → entry HTML, verbatim
//! GET /src/main.js           → source with bare imports rewritten
//! GET /@modules/vue          → package.json "module" entry, rewritten
//! GET /App.vue               → synthesized wrapper module
//! GET /App.vue?type=template → compiled render function
//! GET /App.vue?type=style    → style-injection module
//! GET /logo.png              → raw bytes
//! ```
//!
//! The browser's module loader follows every import the server emits, so
//! resolution recurses across the network rather than in-process.
//!
//! # Modules
//!
//! - [`request`] - request descriptors and the closed set of request kinds
//! - [`handler`] - dispatch from a request kind to a response
//! - [`rewrite`] - bare import specifier rewriting
//! - [`resolver`] - bare module resolution through `package.json`
//! - [`sfc`] - single-file component parsing, compiling and decomposition
//! - [`assets`] - static asset classification and content types
//! - [`runtime`] - filesystem access abstraction
//!
//! # Example
//!
//! ```rust,no_run
//! use nobu::{DevHandler, HandlerOptions, RequestDescriptor};
//!
//! # async fn example() -> nobu::Result<()> {
//! let handler = DevHandler::new(HandlerOptions::new("."));
//! let response = handler
//!     .handle(&RequestDescriptor::from_uri_parts("/App.vue", Some("type=style")))
//!     .await?;
//! assert_eq!(response.content_type, "application/javascript");
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod error;
pub mod handler;
pub mod paths;
pub mod request;
pub mod resolver;
pub mod rewrite;
pub mod runtime;
pub mod sfc;

pub use assets::AssetKind;
pub use error::{Error, Result};
pub use handler::{DevHandler, DevResponse, HandlerOptions};
pub use request::{RequestDescriptor, RequestKind, SectionKind, MODULES_PREFIX};
pub use resolver::BareModuleResolver;
pub use rewrite::rewrite_imports;
pub use runtime::{NativeRuntime, Runtime, RuntimeError, RuntimeResult};
pub use sfc::{ComponentDecomposer, ComponentDocument, ComponentParser, TemplateCompiler};
