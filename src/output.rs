//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every page is its positional index and title (or route), with
//! filesystem paths shown as secondary context via indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Routes
//!
//! ```text
//! Routes
//! 001 basics
//!     Source: basics.mdx
//! 002 intro/setup
//!     Source: intro/setup.mdx
//! ```
//!
//! ## Check
//!
//! ```text
//! Content
//! 001 Basics → basics
//!     Source: basics.mdx
//! 002 Setting up (draft) → intro/setup
//!     Source: intro/setup.mdx
//!     Description: Installing the toolchain
//!
//! Checked 2 pages (1 draft)
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! Posts → blog/index.html
//! 001 Basics → blog/basics/index.html
//! 002 Setting up → blog/intro/setup/index.html
//!     Linked: 3f2a9c01-diagram.png
//!
//! Generated 2 pages, 1 linked file (1 draft skipped)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::SiteConfig;
use crate::generate::BuildReport;
use crate::registry::ContentRegistry;
use crate::resolve::Route;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to `root`, `/`-separated, for `Source:` lines.
fn display_source(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// routes
// ============================================================================

/// Format the route listing.
pub fn format_routes(routes: &[Route], content_root: &Path) -> Vec<String> {
    let mut lines = vec!["Routes".to_string()];
    if routes.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, route) in routes.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), route.segments));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            display_source(&route.source, content_root)
        ));
    }
    lines
}

/// Print the route listing to stdout.
pub fn print_routes(routes: &[Route], content_root: &Path) {
    for line in format_routes(routes, content_root) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the content inventory produced by `check`.
pub fn format_check(registry: &ContentRegistry, content_root: &Path) -> Vec<String> {
    let mut lines = vec!["Content".to_string()];
    let mut drafts = 0;

    for (i, file) in registry.iter().enumerate() {
        let draft_marker = if file.meta.draft {
            drafts += 1;
            " (draft)"
        } else {
            ""
        };
        lines.push(format!(
            "{} {}{} → {}",
            format_index(i + 1),
            file.title,
            draft_marker,
            file.base_path()
        ));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            display_source(&file.source, content_root)
        ));
        if let Some(desc) = &file.meta.description {
            let truncated = truncate_desc(desc.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("{}Description: {}", indent(1), truncated));
            }
        }
    }

    lines.push(String::new());
    let mut summary = format!("Checked {}", plural(registry.len(), "page", "pages"));
    if drafts > 0 {
        summary.push_str(&format!(" ({})", plural(drafts, "draft", "drafts")));
    }
    lines.push(summary);
    lines
}

/// Print the `check` inventory to stdout.
pub fn print_check(registry: &ContentRegistry, content_root: &Path) {
    for line in format_check(registry, content_root) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the result of a build.
pub fn format_build(report: &BuildReport, config: &SiteConfig) -> Vec<String> {
    let mut lines = vec![
        "Home → index.html".to_string(),
        format!("Posts → {}/index.html", config.route_prefix),
    ];

    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            page.title,
            display_source(&page.output, Path::new(""))
        ));
        for asset in &page.assets {
            lines.push(format!("{}Linked: {}", indent(1), asset));
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "Generated {}, {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.assets.len(), "linked file", "linked files")
    );
    if report.drafts_skipped > 0 {
        summary.push_str(&format!(
            " ({} skipped)",
            plural(report.drafts_skipped, "draft", "drafts")
        ));
    }
    lines.push(summary);
    lines
}

/// Print the build result to stdout.
pub fn print_build(report: &BuildReport, config: &SiteConfig) {
    for line in format_build(report, config) {
        println!("{}", line);
    }
}
