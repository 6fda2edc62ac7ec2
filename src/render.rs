//! Markdown body → HTML.
//!
//! The body is parsed with pulldown-cmark and the event stream is rewritten
//! before HTML is emitted:
//!
//! - Fenced and indented code blocks → [`components::code_block`]
//! - Raw HTML that is exactly one registered component tag →
//!   [`Components::expand`]
//! - Relative links and images → rewritten (see below)
//!
//! ## Linked Files
//!
//! A relative link target is resolved against the directory of the content
//! file:
//!
//! | Target | Result |
//! |--------|--------|
//! | Another published content file | `/{route_prefix}/{route}` |
//! | Unpublished content file (draft, hidden) | left untouched, logged as a warning |
//! | Any other existing file | copied to `/{static_dir}/{hash}-{name}` |
//! | Missing file | left untouched, logged as a warning |
//!
//! `{hash}` is the first 8 hex digits of the file's SHA-256, so two files with
//! the same name never collide and unchanged files keep stable URLs.

use crate::components::{self, ComponentError, Components};
use crate::config::SiteConfig;
use crate::content::ContentFile;
use crate::resolve::{self, RouteSegments};
use percent_encoding::percent_decode_str;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{path}: {source}")]
    Component {
        path: PathBuf,
        #[source]
        source: ComponentError,
    },
    #[error("Cannot read linked file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything rendering needs besides the file itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub content_root: &'a Path,
    pub components: &'a Components,
    /// Route keys that get a page in this build. Links to any other content
    /// file are left as written.
    pub published: &'a BTreeSet<String>,
}

/// A local file referenced from content, to be copied into the static dir.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkedAsset {
    pub source: PathBuf,
    /// File name inside the static dir (`{hash}-{name}`).
    pub file_name: String,
}

/// Rendered article body plus the files it links to.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub html: String,
    pub assets: Vec<LinkedAsset>,
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Render a content file's body.
pub fn render(file: &ContentFile, ctx: &RenderContext<'_>) -> Result<RenderedPage, RenderError> {
    let base_dir = file.source.parent().unwrap_or(Path::new(""));
    let mut assets = Vec::new();
    let mut events = Vec::new();
    let mut code: Option<(String, String)> = None;

    for event in Parser::new_ext(&file.body, markdown_options()) {
        if let Some((_, buffer)) = code.as_mut() {
            match event {
                Event::Text(text) => buffer.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    let (info, buffer) = code.take().unwrap_or_default();
                    let markup = components::code_block(&buffer, &info, &ctx.config.code);
                    events.push(Event::Html(markup.into_string().into()));
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                code = Some((info, String::new()));
            }
            Event::Html(raw) => {
                events.push(Event::Html(expand_component(raw, file, ctx)?));
            }
            Event::InlineHtml(raw) => {
                events.push(Event::InlineHtml(expand_component(raw, file, ctx)?));
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = rewrite_link(dest_url, base_dir, ctx, &mut assets)?;
                events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = rewrite_link(dest_url, base_dir, ctx, &mut assets)?;
                events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(file.body.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());

    assets.sort();
    assets.dedup();
    Ok(RenderedPage { html: out, assets })
}

fn expand_component<'a>(
    raw: CowStr<'a>,
    file: &ContentFile,
    ctx: &RenderContext<'_>,
) -> Result<CowStr<'a>, RenderError> {
    match ctx.components.expand(&raw) {
        Some(Ok(markup)) => Ok(markup.into_string().into()),
        Some(Err(source)) => Err(RenderError::Component {
            path: file.source.clone(),
            source,
        }),
        None => Ok(raw),
    }
}

/// True for targets that stay as written: absolute paths, fragments,
/// and anything with a URL scheme.
fn is_external(url: &str) -> bool {
    if url.is_empty() || url.starts_with(['/', '#', '?']) {
        return true;
    }
    match url.find(':') {
        Some(colon) => !url[..colon].contains(['/', '.']),
        None => false,
    }
}

fn rewrite_link<'a>(
    url: CowStr<'a>,
    base_dir: &Path,
    ctx: &RenderContext<'_>,
    assets: &mut Vec<LinkedAsset>,
) -> Result<CowStr<'a>, RenderError> {
    if is_external(&url) {
        return Ok(url);
    }

    let split = url.find(['#', '?']).unwrap_or(url.len());
    let (target, suffix) = url.split_at(split);
    let path = base_dir.join(percent_decode_str(target).decode_utf8_lossy().as_ref());
    if !path.is_file() {
        tracing::warn!(link = %url, resolved = %path.display(), "linked file not found");
        return Ok(url);
    }

    let is_content = path
        .extension()
        .is_some_and(|e| e == ctx.config.extension.as_str());
    if is_content && let Some(route) = content_route(&path, ctx.content_root) {
        if !ctx.published.contains(&route.key()) {
            tracing::warn!(link = %url, route = %route, "linked page is not published");
            return Ok(url);
        }
        let href = format!("/{}/{}{}", ctx.config.route_prefix, route.url_path(), suffix);
        return Ok(href.into());
    }

    let asset = linked_asset(&path)?;
    let href = format!(
        "/{}/{}{}",
        ctx.config.static_dir,
        resolve::encode_segment(&asset.file_name),
        suffix
    );
    tracing::debug!(source = %path.display(), href = %href, "linked file");
    assets.push(asset);
    Ok(href.into())
}

/// Route of a content file linked by relative path, if it lies under the root.
fn content_route(path: &Path, root: &Path) -> Option<RouteSegments> {
    // Links may contain `..`; resolve them before comparing with the root.
    let path = fs::canonicalize(path).ok()?;
    let root = fs::canonicalize(root).ok()?;
    resolve::resolve(&path, &root).ok()
}

fn linked_asset(path: &Path) -> Result<LinkedAsset, RenderError> {
    let bytes = fs::read(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = Sha256::digest(&bytes);
    let hash: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(LinkedAsset {
        source: path.to_path_buf(),
        file_name: format!("{hash}-{name}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn render_str(body: &str) -> RenderedPage {
        let tmp = TempDir::new().unwrap();
        render_in(tmp.path(), "page.mdx", body)
    }

    /// Render with every discovered content file published.
    fn render_in(root: &Path, rel: &str, body: &str) -> RenderedPage {
        let published = resolve::list_routes(root, "mdx")
            .unwrap()
            .into_iter()
            .map(|r| r.segments.key())
            .collect();
        render_published(root, rel, body, &published)
    }

    fn render_published(
        root: &Path,
        rel: &str,
        body: &str,
        published: &BTreeSet<String>,
    ) -> RenderedPage {
        let config = SiteConfig::default();
        let components = Components::standard();
        let ctx = RenderContext {
            config: &config,
            content_root: root,
            components: &components,
            published,
        };
        let source = root.join(rel);
        let file = ContentFile::parse(
            resolve::resolve(&source, root).unwrap(),
            source,
            body,
        )
        .unwrap();
        render(&file, &ctx).unwrap()
    }

    #[test]
    fn renders_basic_markdown() {
        let page = render_str("Some **bold** and *italic*.\n");
        assert!(page.html.contains("<strong>bold</strong>"));
        assert!(page.html.contains("<em>italic</em>"));
        assert!(page.assets.is_empty());
    }

    #[test]
    fn renders_tables() {
        let page = render_str("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(page.html.contains("<table>"));
    }

    #[test]
    fn fenced_code_goes_through_code_block() {
        let page = render_str("```rust\nfn main() {}\n```\n");
        assert!(page.html.contains("language-rust"));
        assert!(page.html.contains("token-line"));
        assert!(page.html.contains("fn main() {}"));
    }

    #[test]
    fn fence_without_language_uses_default() {
        let page = render_str("```\nconsole.log(1)\n```\n");
        assert!(page.html.contains("language-js"));
    }

    #[test]
    fn indented_code_goes_through_code_block() {
        let page = render_str("Para\n\n    indented\n");
        assert!(page.html.contains("language-js"));
        assert!(page.html.contains("indented"));
    }

    #[test]
    fn mp4_block_is_expanded() {
        let page = render_str("Watch:\n\n<MP4 src=\"/media/demo.mp4\" />\n\nDone.\n");
        assert!(page.html.contains(r#"<video controls><source type="video/mp4" src="/media/demo.mp4"></video>"#));
        assert!(!page.html.contains("<MP4"));
    }

    #[test]
    fn mp4_inline_is_expanded() {
        let page = render_str("Inline <MP4 src=\"/a.mp4\" /> clip.\n");
        assert!(page.html.contains("<video controls>"));
    }

    #[test]
    fn mp4_missing_src_is_error() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let components = Components::standard();
        let published = BTreeSet::new();
        let ctx = RenderContext {
            config: &config,
            content_root: tmp.path(),
            components: &components,
            published: &published,
        };
        let file = ContentFile::parse(
            RouteSegments::from_key("p").unwrap(),
            tmp.path().join("p.mdx"),
            "<MP4 />\n",
        )
        .unwrap();
        assert!(matches!(
            render(&file, &ctx),
            Err(RenderError::Component { .. })
        ));
    }

    #[test]
    fn other_html_passes_through() {
        let page = render_str("<div class=\"note\">\nhi\n</div>\n");
        assert!(page.html.contains("<div class=\"note\">"));
    }

    // =========================================================================
    // Links
    // =========================================================================

    #[test]
    fn external_links_untouched() {
        assert!(is_external("https://example.com/a.png"));
        assert!(is_external("mailto:me@example.com"));
        assert!(is_external("/absolute.png"));
        assert!(is_external("#section"));
        assert!(!is_external("images/a.png"));
        assert!(!is_external("./a:b.png"));

        let page = render_str("[x](https://example.com/a.png)\n");
        assert!(page.html.contains("href=\"https://example.com/a.png\""));
    }

    #[test]
    fn linked_image_is_copied_with_hash_name() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("intro")).unwrap();
        fs::write(tmp.path().join("intro/diagram.png"), b"png-bytes").unwrap();

        let page = render_in(tmp.path(), "intro/setup.mdx", "![d](diagram.png)\n");
        assert_eq!(page.assets.len(), 1);
        let asset = &page.assets[0];
        assert!(asset.file_name.ends_with("-diagram.png"));
        assert_eq!(asset.file_name.len(), "12345678-diagram.png".len());
        assert!(page.html.contains(&format!("src=\"/tutorial_files/{}\"", asset.file_name)));
    }

    #[test]
    fn same_file_linked_twice_is_one_asset() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.pdf"), b"pdf").unwrap();

        let page = render_in(tmp.path(), "p.mdx", "[a](notes.pdf) [b](./notes.pdf#page=2)\n");
        assert_eq!(page.assets.len(), 1);
        let href = format!("/tutorial_files/{}", page.assets[0].file_name);
        assert!(page.html.contains(&format!("href=\"{href}\"")));
        assert!(page.html.contains(&format!("href=\"{href}#page=2\"")));
    }

    #[test]
    fn missing_linked_file_left_alone() {
        let page = render_str("[gone](missing.zip)\n");
        assert!(page.html.contains("href=\"missing.zip\""));
        assert!(page.assets.is_empty());
    }

    #[test]
    fn link_to_content_file_becomes_route() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("intro")).unwrap();
        fs::write(tmp.path().join("intro/setup.mdx"), "# Setup\n").unwrap();
        fs::write(tmp.path().join("basics.mdx"), "# Basics\n").unwrap();

        let page = render_in(tmp.path(), "basics.mdx", "[next](intro/setup.mdx#install)\n");
        assert!(page.html.contains("href=\"/blog/intro/setup#install\""));
        assert!(page.assets.is_empty());

        let page = render_in(tmp.path(), "intro/setup.mdx", "[back](../basics.mdx)\n");
        assert!(page.html.contains("href=\"/blog/basics\""));
    }

    #[test]
    fn link_to_unpublished_page_left_alone() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".hidden")).unwrap();
        fs::write(tmp.path().join("live.mdx"), "# Live\n").unwrap();
        fs::write(tmp.path().join("wip.mdx"), "---\ndraft: true\n---\n").unwrap();
        fs::write(tmp.path().join(".hidden/s.mdx"), "# Secret\n").unwrap();

        // Drafts are discovered but not published.
        let published = BTreeSet::from(["live".to_string()]);
        let page = render_published(
            tmp.path(),
            "live.mdx",
            "[wip](wip.mdx) [secret](.hidden/s.mdx) [self](live.mdx)\n",
            &published,
        );
        assert!(page.html.contains("href=\"wip.mdx\""));
        assert!(page.html.contains("href=\".hidden/s.mdx\""));
        assert!(page.html.contains("href=\"/blog/live\""));
        assert!(!page.html.contains("/blog/wip"));
        assert!(!page.html.contains("/blog/.hidden"));
        assert!(page.assets.is_empty());
    }

    #[test]
    fn route_links_are_percent_encoded() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("c#.mdx"), "# C sharp\n").unwrap();
        fs::write(tmp.path().join("a b.pdf"), b"pdf").unwrap();

        let page = render_in(tmp.path(), "p.mdx", "[c](c%23.mdx) [pdf](a%20b.pdf)\n");
        assert!(page.html.contains("href=\"/blog/c%23\""), "{}", page.html);
        assert_eq!(page.assets.len(), 1);
        assert!(page.assets[0].file_name.ends_with("-a b.pdf"));
        assert!(page.html.contains("-a%20b.pdf\""), "{}", page.html);
    }
}
