//! Custom content components.
//!
//! Content can use a small set of capitalized JSX-style tags that expand into
//! HTML, and every fenced code block is routed through [`code_block`]:
//!
//! ~~~text
//! <MP4 src="/media/demo.mp4" />
//!   → <video controls><source type="video/mp4" src="/media/demo.mp4"></video>
//!
//! ```rust
//! fn main() {}
//! ```
//!   → <pre class="prism-code language-rust" style="..."><div class="token-line">…
//! ~~~
//!
//! Tags are looked up in a [`Components`] table. Tags not in the table pass
//! through untouched as raw HTML.
//!
//! ## Code Blocks
//!
//! The markup mirrors Prism's line/token structure (`token-line` divs holding
//! `token` spans) so Prism themes and client-side highlighters apply without
//! changes. Tokenizing is left to them; every line is emitted as one `plain`
//! token in the configured theme colors.

use crate::config::CodeConfig;
use maud::{Markup, html};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ComponentError {
    #[error("<{component}> requires a `{attribute}` attribute")]
    MissingAttribute {
        component: String,
        attribute: &'static str,
    },
}

/// Attributes of a component tag, string-valued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    attrs: BTreeMap<String, String>,
}

impl Props {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn require(&self, component: &str, attribute: &'static str) -> Result<&str, ComponentError> {
        self.get(attribute)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ComponentError::MissingAttribute {
                component: component.to_string(),
                attribute,
            })
    }
}

/// Renders one component tag.
pub type ComponentFn = fn(&Props) -> Result<Markup, ComponentError>;

/// Tag name → renderer table.
#[derive(Clone)]
pub struct Components {
    table: BTreeMap<String, ComponentFn>,
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

impl Default for Components {
    fn default() -> Self {
        Self::standard()
    }
}

impl Components {
    /// An empty table: every tag passes through.
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// The stock table: `MP4`.
    pub fn standard() -> Self {
        let mut components = Self::empty();
        components.register("MP4", mp4);
        components
    }

    pub fn register(&mut self, name: &str, render: ComponentFn) {
        self.table.insert(name.to_string(), render);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Expand a raw HTML fragment if it is exactly one registered tag.
    ///
    /// Returns `None` for anything else: other HTML, unregistered tags, or
    /// a fragment with more than one tag. A closing tag of a registered
    /// component expands to empty markup.
    pub fn expand(&self, fragment: &str) -> Option<Result<Markup, ComponentError>> {
        let tag = parse_tag(fragment)?;
        let render = self.table.get(&tag.name)?;
        if tag.closing {
            return Some(Ok(html! {}));
        }
        Some(render(&tag.props))
    }
}

// ============================================================================
// Tag parsing
// ============================================================================

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<(/?)([A-Z][A-Za-z0-9_]*)((?:\s+[A-Za-z_][\w-]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^}]*\}))?)*)\s*/?>\s*$"#)
        .expect("static regex")
});
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`|([^}]*?))\s*\}))?"#)
        .expect("static regex")
});

#[derive(Debug, PartialEq)]
struct ParsedTag {
    name: String,
    closing: bool,
    props: Props,
}

fn parse_tag(fragment: &str) -> Option<ParsedTag> {
    let caps = TAG.captures(fragment)?;
    let closing = !caps[1].is_empty();
    let name = caps[2].to_string();
    let mut props = Props::default();
    for attr in ATTR.captures_iter(&caps[3]) {
        let value = (2..=7)
            .find_map(|i| attr.get(i))
            .map(|m| m.as_str().trim().to_string())
            // Bare attribute (`autoplay`) is boolean true.
            .unwrap_or_else(|| "true".to_string());
        props.attrs.insert(attr[1].to_string(), value);
    }
    Some(ParsedTag {
        name,
        closing,
        props,
    })
}

// ============================================================================
// Components
// ============================================================================

/// `<MP4 src="..."/>`: an HTML5 video with controls.
pub fn mp4(props: &Props) -> Result<Markup, ComponentError> {
    let src = props.require("MP4", "src")?;
    Ok(html! {
        video controls {
            source type="video/mp4" src=(src);
        }
    })
}

/// Language class for a fence info string.
///
/// `rust` → `rust`, `language-rust` → `rust`, `rust,ignore` → `rust`,
/// empty → `default`.
pub fn fence_language<'a>(info: &'a str, default: &'a str) -> &'a str {
    let first = info
        .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or_default();
    let lang = first.strip_prefix("language-").unwrap_or(first);
    if lang.is_empty() { default } else { lang }
}

/// Render a fenced code block.
pub fn code_block(code: &str, info: &str, config: &CodeConfig) -> Markup {
    let language = fence_language(info, &config.default_language);
    let code = code.trim_end();
    html! {
        pre class={ "prism-code language-" (language) } style=(config.pre_style()) {
            @for line in code.split('\n') {
                div.token-line {
                    @if line.is_empty() {
                        span.token.plain { "\n" }
                    } @else {
                        span.token.plain { (line) }
                    }
                }
            }
        }
    }
}
