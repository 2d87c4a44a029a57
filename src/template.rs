//! Text surgery on RapidPro's `templates/frame.html`.
//!
//! Two independent fixes, each applied only when needed:
//! 1. the upstream copyright footer is replaced by the brand credit line;
//! 2. template expressions split into `{ { expr } }` are collapsed back to
//!    `{{ expr }}` (some upstream versions ship this, which breaks the inline
//!    JavaScript that reads the org id).
//!
//! The file is rewritten only when its content actually changed.

use std::fs;
use std::path::Path;

use regex::{NoExpand, Regex};
use tracing::{error, info, warn};

use crate::config_file::BrandConfig;
use crate::error::{BrandingError, Result};

/// Upstream footer: "Copyright © <anything> All rights reserved."
pub const FOOTER_PATTERN: &str = r"(?i)Copyright © .*? All rights reserved\.";

/// What happened to the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOutcome {
    /// The template file does not exist
    Missing,
    /// Nothing to fix; file left untouched
    Unchanged,
    /// File rewritten
    Patched { footer: bool, tags_fixed: usize },
    /// Reading, matching or writing failed
    Failed(String),
}

/// Replace up to `limit` matches of `pattern` (0 = all) with the literal
/// `replacement`. Returns the new text and whether anything changed.
pub fn apply_fix_if_needed(text: &str, pattern: &Regex, replacement: &str, limit: usize) -> (String, bool) {
    if !pattern.is_match(text) {
        return (text.to_string(), false);
    }
    let fixed = pattern.replacen(text, limit, NoExpand(replacement)).into_owned();
    let changed = fixed != text;
    (fixed, changed)
}

/// Pattern matching `{ { expr } }` with arbitrary whitespace, for one expression
pub fn malformed_tag_pattern(expr: &str) -> Result<Regex> {
    let pattern = format!(r"\{{\s+\{{\s*{}\s*\}}\s+\}}", regex::escape(expr));
    Regex::new(&pattern)
        .map_err(|e| BrandingError::config(format!("bad template tag {:?}: {}", expr, e)))
}

/// Swap the upstream copyright line for `credits` unless it is already there.
pub fn fix_footer(text: &str, credits: &str) -> Result<(String, bool)> {
    if text.contains(credits) {
        return Ok((text.to_string(), false));
    }
    let pattern = Regex::new(FOOTER_PATTERN)
        .map_err(|e| BrandingError::config(format!("bad footer pattern: {}", e)))?;
    Ok(apply_fix_if_needed(text, &pattern, credits, 1))
}

/// Collapse every `{ { expr } }` into `{{ expr }}`; returns how many
/// expressions needed fixing.
pub fn fix_template_tags<S: AsRef<str>>(text: &str, exprs: &[S]) -> Result<(String, usize)> {
    let mut current = text.to_string();
    let mut fixed = 0;
    for expr in exprs {
        let expr = expr.as_ref();
        let pattern = malformed_tag_pattern(expr)?;
        let (next, changed) = apply_fix_if_needed(&current, &pattern, &format!("{{{{ {} }}}}", expr), 0);
        if changed {
            fixed += 1;
            current = next;
        }
    }
    Ok((current, fixed))
}

/// Patch the template at `path`. Never returns an error; see [`TemplateOutcome`].
pub fn patch_template(path: &Path, config: &BrandConfig) -> TemplateOutcome {
    info!("Patching templates...");

    if !path.exists() {
        error!("{} not found.", path.display());
        return TemplateOutcome::Missing;
    }

    match try_patch(path, config) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Template patching failed: {}", e);
            TemplateOutcome::Failed(e.to_string())
        }
    }
}

fn try_patch(path: &Path, config: &BrandConfig) -> Result<TemplateOutcome> {
    let original = fs::read_to_string(path)?;

    let (content, footer) = fix_footer(&original, &config.credits)?;
    if footer {
        info!("✓ Footer copyright updated.");
    } else if !content.contains(&config.credits) {
        warn!("No copyright notice found in {}; footer left as is", path.display());
    }

    let (content, tags_fixed) = fix_template_tags(&content, &config.template_tags)?;
    if tags_fixed > 0 {
        info!("✓ Fixed {} malformed template tag(s).", tags_fixed);
    }

    if content == original {
        info!("Template already up to date.");
        return Ok(TemplateOutcome::Unchanged);
    }

    fs::write(path, content)?;
    Ok(TemplateOutcome::Patched { footer, tags_fixed })
}
