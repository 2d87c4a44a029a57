//! Settings patcher: owns one marker-delimited block in RapidPro's `settings.py`.
//!
//! The block is rendered from a [`BrandConfig`] and spliced into the file by
//! [`replace_or_append_block`], a pure text transform. [`apply_overrides`]
//! wraps it with the read/write of the actual file.
//!
//! # Invariants
//!
//! - After a run the file holds exactly one start marker and one end marker.
//! - Content outside the block is preserved (modulo surrounding whitespace,
//!   which is trimmed once on the first run).
//! - Rendering is deterministic, so a second run writes the same bytes.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::config::{layout, MARKER_END, MARKER_START, SETTINGS_BASELINE};
use crate::config_file::BrandConfig;
use crate::error::{BrandingError, Result};

/// What to do with a start marker whose end marker is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Drop the orphaned marker and the partial block lines after it, keep
    /// everything from the first foreign line on
    #[default]
    PreserveTail,
    /// Drop everything from the orphaned marker to end-of-file
    Truncate,
}

/// Result of removing previous branding blocks from a text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StripOutcome {
    pub text: String,
    /// Complete start..end blocks removed
    pub blocks_removed: usize,
    /// Start markers that had no end marker after them
    pub orphaned_starts: usize,
    /// End markers that had no start marker before them
    pub stray_ends: usize,
}

/// Line prefixes (after indentation) of everything [`render_block`] emits
/// between the markers.
const BLOCK_LINE_PREFIXES: &[&str] = &[
    "BRAND[",
    "ALLOWED_HOSTS",
    "SECURE_PROXY_SSL_HEADER",
    "CSRF_TRUSTED_ORIGINS",
    "f\"https://",
    "\"https://",
    "SESSION_COOKIE_SECURE",
    "CSRF_COOKIE_SECURE",
    "ACCOUNT_DEFAULT_HTTP_PROTOCOL",
    "# Brand Overrides",
    "# Logo Paths",
    "# Feature Flags",
    "# Security & Proxy Settings",
];

/// True for a line a branding block could have written
fn is_block_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line == "]" || BLOCK_LINE_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Byte length of the leading run of block lines in `tail`.
///
/// A half-written block left by an interrupted write is dropped this way,
/// so an unclosed `CSRF_TRUSTED_ORIGINS = [` never survives into the output.
fn block_fragment_len(tail: &str) -> usize {
    tail.split_inclusive('\n')
        .take_while(|line| is_block_line(line))
        .map(str::len)
        .sum()
}

/// Remove every existing block delimited by `start`/`end` from `text`.
pub fn strip_block(text: &str, start: &str, end: &str, policy: OrphanPolicy) -> StripOutcome {
    let mut outcome = StripOutcome::default();
    let mut rest = text.to_string();

    while let Some(start_idx) = rest.find(start) {
        let after_start = start_idx + start.len();
        match rest[after_start..].find(end) {
            Some(rel_end) => {
                let block_end = after_start + rel_end + end.len();
                rest.replace_range(start_idx..block_end, "");
                outcome.blocks_removed += 1;
            }
            None => {
                outcome.orphaned_starts += 1;
                match policy {
                    OrphanPolicy::PreserveTail => {
                        let fragment_end = after_start + block_fragment_len(&rest[after_start..]);
                        rest.replace_range(start_idx..fragment_end, "");
                    }
                    OrphanPolicy::Truncate => rest.truncate(start_idx),
                }
            }
        }
    }

    let mut kept = String::with_capacity(rest.len());
    for line in rest.split_inclusive('\n') {
        if line.trim() == end {
            outcome.stray_ends += 1;
        } else {
            kept.push_str(line);
        }
    }

    outcome.text = kept;
    outcome
}

/// Splice `block` into `text`, replacing any previous block.
///
/// The output is `trimmed remainder + "\n\n" + block + "\n"`, or just
/// `block + "\n"` when nothing remains outside the block.
pub fn replace_or_append_block(
    text: &str,
    start: &str,
    end: &str,
    block: &str,
    policy: OrphanPolicy,
) -> String {
    let stripped = strip_block(text, start, end, policy);
    join_block(&stripped.text, block)
}

fn join_block(remainder: &str, block: &str) -> String {
    let prefix = remainder.trim();
    if prefix.is_empty() {
        format!("{}\n", block)
    } else {
        format!("{}\n\n{}\n", prefix, block)
    }
}

/// Python double-quoted string literal
fn py_str(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Python list of single-quoted string literals, as `repr()` prints it
fn py_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted: Vec<String> = items
        .into_iter()
        .map(|s| format!("'{}'", s.as_ref().replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Render the full branding block, markers included, without a trailing newline.
pub fn render_block(config: &BrandConfig) -> String {
    let features = py_list(config.features.iter().map(|f| f.as_str()));
    let lines = [
        MARKER_START.to_string(),
        "# Brand Overrides".to_string(),
        format!("BRAND[\"name\"] = {}", py_str(&config.name)),
        format!("BRAND[\"description\"] = {}", py_str(&config.description)),
        format!("BRAND[\"domain\"] = {}", py_str(&config.domain)),
        format!("BRAND[\"emails\"][\"notifications\"] = {}", py_str(&config.support_email)),
        format!("BRAND[\"hosts\"] = {}", py_list(&config.hosts)),
        "ALLOWED_HOSTS = [\"*\"]".to_string(),
        String::new(),
        "# Logo Paths (Relative to STATIC_URL)".to_string(),
        format!("BRAND[\"logos\"][\"primary\"] = {}", py_str(&layout::logo_url())),
        format!("BRAND[\"logos\"][\"favico\"] = {}", py_str(&layout::favicon_url())),
        format!("BRAND[\"logos\"][\"avatar\"] = {}", py_str(&layout::favicon_url())),
        format!("BRAND[\"landing\"][\"hero\"] = {}", py_str(&layout::splash_url())),
        String::new(),
        "# Feature Flags".to_string(),
        format!("BRAND[\"features\"] = {}", features),
        String::new(),
        "# Security & Proxy Settings".to_string(),
        "SECURE_PROXY_SSL_HEADER = ('HTTP_X_FORWARDED_PROTO', 'https')".to_string(),
        "CSRF_TRUSTED_ORIGINS = [".to_string(),
        "    f\"https://{BRAND['domain']}\",".to_string(),
        "    f\"https://*.{BRAND['domain']}\",".to_string(),
        "    \"https://localhost\",".to_string(),
        "    \"https://127.0.0.1\"".to_string(),
        "]".to_string(),
        "SESSION_COOKIE_SECURE = True".to_string(),
        "CSRF_COOKIE_SECURE = True".to_string(),
        "ACCOUNT_DEFAULT_HTTP_PROTOCOL = \"https\"".to_string(),
        MARKER_END.to_string(),
    ];
    lines.join("\n")
}

/// Inject or refresh the branding block in the settings file at `path`.
///
/// Creates the file with the baseline import when it does not exist. Errors
/// are returned to the caller; this step has no internal guard.
pub fn apply_overrides(path: &Path, config: &BrandConfig, policy: OrphanPolicy) -> Result<()> {
    info!("Applying configuration overrides to {}...", path.display());

    if !path.exists() {
        warn!("{} not found. Creating it with default import...", path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BrandingError::settings(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(path, format!("{}\n", SETTINGS_BASELINE)).map_err(|e| {
            BrandingError::settings(format!("cannot create {}: {}", path.display(), e))
        })?;
    }

    let current = fs::read_to_string(path)
        .map_err(|e| BrandingError::settings(format!("cannot read {}: {}", path.display(), e)))?;

    let stripped = strip_block(&current, MARKER_START, MARKER_END, policy);
    if stripped.blocks_removed > 0 {
        info!("Branding configuration already present. Updating...");
    }
    if stripped.orphaned_starts > 0 {
        match policy {
            OrphanPolicy::PreserveTail => warn!(
                "Start marker without end marker in {}; dropping the partial block, keeping the content after it",
                path.display()
            ),
            OrphanPolicy::Truncate => warn!(
                "Start marker without end marker in {}; discarding everything after it",
                path.display()
            ),
        }
    }
    if stripped.stray_ends > 0 {
        warn!("Removed {} stray end marker(s) from {}", stripped.stray_ends, path.display());
    }

    let updated = join_block(&stripped.text, &render_block(config));
    fs::write(path, updated)
        .map_err(|e| BrandingError::settings(format!("cannot write {}: {}", path.display(), e)))?;

    info!("✓ settings.py updated successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const START: &str = "# <<";
    const END: &str = "# >>";

    #[test]
    fn test_append_to_plain_text() {
        let out = replace_or_append_block("A = 1\n", START, END, "# <<\nX\n# >>", OrphanPolicy::default());
        assert_eq!(out, "A = 1\n\n# <<\nX\n# >>\n");
    }

    #[test]
    fn test_replace_existing_block_keeps_surroundings() {
        let text = "A = 1\n\n# <<\nOLD\n# >>\nB = 2\n";
        let out = replace_or_append_block(text, START, END, "# <<\nNEW\n# >>", OrphanPolicy::default());
        assert_eq!(out, "A = 1\n\n\nB = 2\n\n# <<\nNEW\n# >>\n");
        assert!(!out.contains("OLD"));
    }

    #[test]
    fn test_empty_input_yields_block_only() {
        let out = replace_or_append_block("", START, END, "# <<\nX\n# >>", OrphanPolicy::default());
        assert_eq!(out, "# <<\nX\n# >>\n");
    }

    #[test]
    fn test_orphan_preserve_tail() {
        let text = "A = 1\n# <<\nOLD = 1\nTAIL = 2\n";
        let stripped = strip_block(text, START, END, OrphanPolicy::PreserveTail);
        assert_eq!(stripped.orphaned_starts, 1);
        assert!(stripped.text.contains("TAIL = 2"));
        assert!(!stripped.text.contains(START));
    }

    #[test]
    fn test_orphan_truncate() {
        let text = "A = 1\n# <<\nOLD = 1\nTAIL = 2\n";
        let stripped = strip_block(text, START, END, OrphanPolicy::Truncate);
        assert_eq!(stripped.text, "A = 1\n");
    }

    #[test]
    fn test_duplicate_blocks_collapse() {
        let text = "# <<\n1\n# >>\nmid\n# <<\n2\n# >>\n";
        let out = replace_or_append_block(text, START, END, "# <<\nN\n# >>", OrphanPolicy::default());
        assert_eq!(out.matches(START).count(), 1);
        assert_eq!(out.matches(END).count(), 1);
        assert!(out.starts_with("mid"));
    }

    #[test]
    fn test_stray_end_marker_removed() {
        let text = "A = 1\n# >>\nB = 2\n";
        let stripped = strip_block(text, START, END, OrphanPolicy::default());
        assert_eq!(stripped.stray_ends, 1);
        assert_eq!(stripped.text, "A = 1\nB = 2\n");
    }

    #[test]
    fn test_end_marker_text_inside_other_line_kept() {
        let text = "NOTE = \"see # >> below\"\n";
        let stripped = strip_block(text, START, END, OrphanPolicy::default());
        assert_eq!(stripped.stray_ends, 0);
        assert_eq!(stripped.text, text);
    }

    #[test]
    fn test_every_rendered_line_is_block_owned() {
        let block = render_block(&BrandConfig::default());
        for line in block.lines().filter(|l| *l != MARKER_START && *l != MARKER_END) {
            assert!(is_block_line(line), "not recognised as block line: {:?}", line);
        }
    }

    #[test]
    fn test_interrupted_write_leaves_valid_settings() {
        let block = render_block(&BrandConfig::default());
        let cut = block.find("    \"https://localhost\"").unwrap();
        let text = format!("{}\n\n{}", SETTINGS_BASELINE, &block[..cut]);

        let out = replace_or_append_block(&text, MARKER_START, MARKER_END, &block, OrphanPolicy::PreserveTail);

        assert_eq!(out, format!("{}\n\n{}\n", SETTINGS_BASELINE, block));
        assert_eq!(out.matches("CSRF_TRUSTED_ORIGINS = [").count(), 1);
    }

    #[test]
    fn test_orphan_fragment_stops_at_user_line() {
        let text = "# <<\nBRAND[\"name\"] = \"Old\"\nALLOWED_HOSTS = [\"*\"]\nTIME_ZONE = \"UTC\"\nDEBUG = False\n";
        let stripped = strip_block(text, START, END, OrphanPolicy::PreserveTail);
        assert_eq!(stripped.text, "TIME_ZONE = \"UTC\"\nDEBUG = False\n");
    }

    #[test]
    fn test_render_block_contents() {
        let block = render_block(&BrandConfig::default());
        assert!(block.starts_with(MARKER_START));
        assert!(block.ends_with(MARKER_END));
        assert!(block.contains("BRAND[\"name\"] = \"KonexPro\""));
        assert!(block.contains(
            "BRAND[\"hosts\"] = ['lrn2.org', 'localhost', '127.0.0.1', 'box.lan', '*']"
        ));
        assert!(block.contains("BRAND[\"emails\"][\"notifications\"] = \"support@lrn2.org\""));
        assert!(block.contains("BRAND[\"logos\"][\"primary\"] = \"images/konexpro-logo.svg\""));
        assert!(block.contains("BRAND[\"landing\"][\"hero\"] = \"brands/rapidpro/konexpro-splash.png\""));
        assert!(block.contains("BRAND[\"features\"] = ['signups', 'msgs', 'flows'"));
        assert!(block.contains("SECURE_PROXY_SSL_HEADER = ('HTTP_X_FORWARDED_PROTO', 'https')"));
        assert!(block.contains("f\"https://*.{BRAND['domain']}\","));
        assert!(block.contains("ACCOUNT_DEFAULT_HTTP_PROTOCOL = \"https\""));
    }

    #[test]
    fn test_render_escapes_quotes() {
        let config = BrandConfig {
            name: "Konex \"Pro\"".to_string(),
            hosts: vec!["o'brien.ht".to_string()],
            ..Default::default()
        };
        let block = render_block(&config);
        assert!(block.contains(r#"BRAND["name"] = "Konex \"Pro\"""#));
        assert!(block.contains(r#"BRAND["hosts"] = ['o\'brien.ht']"#));
    }

    #[test]
    fn test_apply_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temba").join("settings.py");

        apply_overrides(&path, &BrandConfig::default(), OrphanPolicy::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("from temba.settings_common import *\n\n# --- START"));
        assert!(content.ends_with("# --- END KONEXPRO BRANDING ---\n"));
    }

    #[test]
    fn test_apply_twice_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.py");
        fs::write(&path, "from temba.settings_common import *\nDEBUG = False\n").unwrap();

        let config = BrandConfig::default();
        apply_overrides(&path, &config, OrphanPolicy::default()).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        apply_overrides(&path, &config, OrphanPolicy::default()).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        assert!(second.contains("DEBUG = False"));
    }
}
