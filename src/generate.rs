//! HTML site generation.
//!
//! Takes the content registry and writes the final static site. Every page is
//! a full HTML document with no bundled scripts (see "Code Highlighting").
//!
//! ## Generated Pages
//!
//! - **Home page** (`/index.html`): Site title and the list of posts
//! - **Blog index** (`/{route_prefix}/index.html`): One link per post
//! - **Post pages** (`/{route_prefix}/{route}/index.html`): Title and rendered
//!   article body
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                     # Home page
//! ├── routes.json                    # Route parameter sets
//! ├── blog/
//! │   ├── index.html                 # Blog index
//! │   ├── basics/index.html          # content/tutorials/basics.mdx
//! │   └── intro/
//! │       └── setup/index.html       # content/tutorials/intro/setup.mdx
//! └── tutorial_files/
//!     └── 3f2a9c01-diagram.png       # Linked files (hash-prefixed)
//! ```
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and inlined into every page.
//!
//! ## Code Highlighting
//!
//! Pages ship no highlighter script. Code blocks are written in Prism's
//! markup (`pre.prism-code.language-*`, `div.token-line`, `span.token`) with
//! the `[code]` theme colours inline, so they render as a single-colour block
//! as-is. Per-token colours need a client-side highlighter, e.g. Prism with a
//! Night Owl theme, added by the site that hosts the output.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::components::Components;
use crate::config::{ConfigError, SiteConfig};
use crate::content::ContentFile;
use crate::registry::{ContentRegistry, PostSummary, RegistryError};
use crate::render::{self, RenderContext, RenderError};
use crate::types::RoutesManifest;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One written post page.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    /// Route key, e.g. `intro/setup`.
    pub route: String,
    pub title: String,
    /// Output file, relative to the output directory.
    pub output: PathBuf,
    /// Linked files this page references.
    pub assets: Vec<String>,
}

/// What a build wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub pages: Vec<GeneratedPage>,
    /// Copied linked files, relative to the output directory.
    pub assets: Vec<PathBuf>,
    /// Draft pages left out of the build.
    pub drafts_skipped: usize,
}

const CSS: &str = include_str!("../static/style.css");

/// Build the site for a project directory with an already-loaded config.
///
/// Discovers content under the configured content root and writes everything
/// into `output_dir`. The caller loads `config` once (see
/// [`crate::config::load_config`]) and reports with the same value.
pub fn generate(
    project: &Path,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<BuildReport, GenerateError> {
    let content_root = config.content_root_in(project);
    let registry = ContentRegistry::build(&content_root, &config.extension)?;
    generate_site(
        &registry,
        config,
        &content_root,
        &Components::standard(),
        output_dir,
    )
}

/// Write the site for an already-built registry.
pub fn generate_site(
    registry: &ContentRegistry,
    config: &SiteConfig,
    content_root: &Path,
    components: &Components,
    output_dir: &Path,
) -> Result<BuildReport, GenerateError> {
    let published: BTreeSet<String> = registry
        .published(config.include_drafts)
        .map(ContentFile::base_path)
        .collect();
    let ctx = RenderContext {
        config,
        content_root,
        components,
        published: &published,
    };
    let summaries = registry.summaries(config.include_drafts);
    let prefix_dir = output_dir.join(&config.route_prefix);
    let static_dir = output_dir.join(&config.static_dir);
    fs::create_dir_all(&prefix_dir)?;

    let mut report = BuildReport {
        drafts_skipped: registry.len() - summaries.len(),
        ..BuildReport::default()
    };
    let mut copied = BTreeSet::new();

    for file in registry.published(config.include_drafts) {
        let page = render::render(file, &ctx)?;

        for asset in &page.assets {
            if copied.insert(asset.file_name.clone()) {
                fs::create_dir_all(&static_dir)?;
                fs::copy(&asset.source, static_dir.join(&asset.file_name))?;
                tracing::debug!(source = %asset.source.display(), "copied linked file");
                report
                    .assets
                    .push(Path::new(&config.static_dir).join(&asset.file_name));
            }
        }

        let relative = Path::new(&config.route_prefix)
            .join(file.route.as_slice().iter().collect::<PathBuf>())
            .join("index.html");
        let out_path = output_dir.join(&relative);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let html = render_post_page(file, &page.html, config);
        fs::write(&out_path, html.into_string())?;
        tracing::debug!(route = %file.route, output = %out_path.display(), "wrote page");

        report.pages.push(GeneratedPage {
            route: file.base_path(),
            title: file.title.clone(),
            output: relative,
            assets: page.assets.into_iter().map(|a| a.file_name).collect(),
        });
    }

    let index_html = render_blog_index(&summaries, config);
    fs::write(prefix_dir.join("index.html"), index_html.into_string())?;

    let home_html = render_home(&summaries, config);
    fs::write(output_dir.join("index.html"), home_html.into_string())?;

    let routes = RoutesManifest::from_segments(
        registry
            .published(config.include_drafts)
            .map(|file| &file.route),
    );
    fs::write(
        output_dir.join("routes.json"),
        serde_json::to_string_pretty(&routes)?,
    )?;

    tracing::info!(
        pages = report.pages.len(),
        assets = report.assets.len(),
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, site_title: &str, content: Markup) -> Markup {
    let full_title = if title == site_title {
        title.to_string()
    } else {
        format!("{title} · {site_title}")
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header with links home and to the blog index
fn site_header(config: &SiteConfig) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (config.site.title) }
            nav.site-nav {
                a href={ "/" (config.route_prefix) "/" } { "All posts" }
            }
        }
    }
}

/// Centered content column with the page title.
fn layout(title: &str, config: &SiteConfig, content: Markup) -> Markup {
    html! {
        (site_header(config))
        div.layout style={ "width: 100%; max-width: " (config.site.max_width) "; margin: 0 auto" } {
            h1 { (title) }
            (content)
        }
    }
}

/// Renders the list of posts, linking each to its route.
fn post_list(posts: &[PostSummary], route_prefix: &str) -> Markup {
    html! {
        @if posts.is_empty() {
            p.empty { "Nothing published yet." }
        } @else {
            ul.post-list {
                @for post in posts {
                    li {
                        a href={ "/" (route_prefix) "/" (post.url_path) } { (post.title) }
                        @if let Some(desc) = &post.meta.description {
                            p.post-description { (desc) }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a post page around its rendered body
fn render_post_page(file: &ContentFile, body_html: &str, config: &SiteConfig) -> Markup {
    let content = html! {
        @if let Some(date) = &file.meta.date {
            p.post-date { (date) }
        }
        article {
            (PreEscaped(body_html))
        }
    };
    base_document(&file.title, &config.site.title, layout(&file.title, config, content))
}

/// Renders the blog index listing every published post
fn render_blog_index(posts: &[PostSummary], config: &SiteConfig) -> Markup {
    let content = post_list(posts, &config.route_prefix);
    base_document("Posts", &config.site.title, layout("Posts", config, content))
}

/// Renders the home page
fn render_home(posts: &[PostSummary], config: &SiteConfig) -> Markup {
    let title = &config.site.title;
    let content = post_list(posts, &config.route_prefix);
    base_document(title, title, layout(title, config, content))
}

// ============================================================================
// Tests
// ============================================================================
