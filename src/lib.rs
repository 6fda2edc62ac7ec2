//! # Tutorial Press
//!
//! A static site generator for MDX tutorials and blog posts. Your filesystem
//! is the route table: every `.mdx` file under the content root becomes one
//! page, addressed by its relative path with the extension removed.
//!
//! ```text
//! content/tutorials/basics.mdx        →  /blog/basics         ["basics"]
//! content/tutorials/intro/setup.mdx   →  /blog/intro/setup    ["intro", "setup"]
//! ```
//!
//! # Architecture: Resolve, Load, Render
//!
//! ```text
//! 1. Resolve   content root  →  Vec<Route>         (walk + path → segments)
//! 2. Load      Vec<Route>    →  ContentRegistry    (metadata + body per route)
//! 3. Generate  registry      →  dist/              (final HTML site)
//! ```
//!
//! Route discovery runs once per build and finishes before anything is
//! rendered. Pages never locate their own files from route strings: they look
//! content up in the registry by route key.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolve`] | Path resolver: `enumerate`, `resolve`, `list_routes` |
//! | [`content`] | Reads one file: front matter / `export const meta`, title, body |
//! | [`registry`] | Route key → loaded content, draft filtering, index summaries |
//! | [`components`] | Custom tags (`<MP4>`) and the code block renderer |
//! | [`render`] | Markdown → HTML with components and linked-file rewriting |
//! | [`generate`] | Writes pages, indexes, linked files and `routes.json` using Maud |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`types`] | Route parameter sets (`{"paths":[...],"fallback":false}`) |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Structured Paths
//!
//! Routes are computed with [`Path::strip_prefix`](std::path::Path::strip_prefix)
//! and path components, never by cutting strings. A file outside the content
//! root is an error instead of a silently mangled route.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Templates are Rust expressions, interpolation is escaped, and
//! there is no template directory to ship.
//!
//! ## Hash-Prefixed Linked Files
//!
//! Files linked from content (images, PDFs) are copied into one flat static
//! directory. Names carry a short content hash, so two `diagram.png` files in
//! different tutorials never collide and unchanged files keep their URLs.

pub mod components;
pub mod config;
pub mod content;
pub mod generate;
pub mod output;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
