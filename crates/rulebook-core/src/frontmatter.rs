//! Rule-file frontmatter.
//!
//! Rule files carry metadata in a `---` delimited block at the top. Parsing
//! uses a hand-written YAML subset (no external YAML dependency) supporting
//! key-value pairs, booleans, quoted strings and arrays, and accepts the union
//! of keys every dialect writes. Rendering is per [`FrontmatterFlavor`].

use crate::metadata::{extract_callouts, extract_metadata, normalize_globs};
use crate::slug::{derive_description, truncate_description};
use crate::types::{Section, SectionKind};

/// Which keys a dialect writes into rule-file frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFlavor {
    /// `description`, `paths`.
    Claude,
    /// `description`, `globs`, `alwaysApply` (always all three).
    Cursor,
    /// `trigger`, `globs`, `description`.
    Windsurf,
    /// `description`, `applyTo`.
    Copilot,
    /// No frontmatter; metadata goes into inline callouts.
    Callouts,
}

/// Frontmatter fields as written in a rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFrontmatter {
    /// Display name.
    pub name: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// `globs:` entries.
    pub globs: Vec<String>,
    /// `paths:` entries.
    pub paths: Vec<String>,
    /// `applyTo:` value.
    pub apply_to: Option<String>,
    /// `alwaysApply:` value.
    pub always_apply: Option<bool>,
    /// `trigger:` value.
    pub trigger: Option<String>,
    /// `type:` value.
    pub kind: Option<SectionKind>,
}

impl RuleFrontmatter {
    /// Glob scope across `globs`, `paths` and `applyTo`, as `a, b`.
    pub fn scope(&self) -> Option<String> {
        let mut patterns: Vec<&str> = self
            .globs
            .iter()
            .chain(self.paths.iter())
            .map(String::as_str)
            .collect();
        if let Some(apply_to) = self.apply_to.as_deref() {
            if apply_to.trim() != "**" {
                patterns.push(apply_to);
            }
        }
        let joined = normalize_globs(&patterns.join(","));
        (!joined.is_empty()).then_some(joined)
    }

    /// Resolved apply flag, or `None` when the file says nothing.
    ///
    /// An explicit `alwaysApply` wins, then `trigger`, then `applyTo`, then the
    /// presence of a glob scope.
    pub fn apply_flag(&self) -> Option<bool> {
        if let Some(flag) = self.always_apply {
            return Some(flag);
        }
        if let Some(trigger) = self.trigger.as_deref() {
            return Some(trigger == "always_on");
        }
        if let Some(apply_to) = self.apply_to.as_deref() {
            return Some(apply_to.trim() == "**");
        }
        if !self.globs.is_empty() || !self.paths.is_empty() {
            return Some(false);
        }
        None
    }

    /// Non-empty description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// A rule file split into frontmatter and body.
#[derive(Debug, Clone)]
pub struct ParsedRuleFile {
    /// Parsed frontmatter (defaults when absent).
    pub frontmatter: RuleFrontmatter,
    /// Everything after the frontmatter block.
    pub body: String,
    /// Whether a frontmatter block was present.
    pub has_frontmatter: bool,
}

/// Split a rule file into frontmatter and body.
pub fn parse_rule_file(raw: &str) -> ParsedRuleFile {
    let (yaml, body) = split_frontmatter(raw);
    match yaml {
        Some(yaml) => ParsedRuleFile {
            frontmatter: parse_simple_yaml(&yaml),
            body,
            has_frontmatter: true,
        },
        None => ParsedRuleFile {
            frontmatter: RuleFrontmatter::default(),
            body,
            has_frontmatter: false,
        },
    }
}

/// Extract a `---` delimited block from the start of `content`.
///
/// Returns `(yaml, body_after_block)`. Without a closing delimiter the whole
/// content is body.
pub fn split_frontmatter(content: &str) -> (Option<String>, String) {
    let trimmed = content.trim_start();
    let Some(after_first) = trimmed.strip_prefix("---") else {
        return (None, content.to_string());
    };
    let Some(after_first) = after_first
        .strip_prefix('\n')
        .or_else(|| after_first.strip_prefix("\r\n"))
    else {
        return (None, content.to_string());
    };

    let (yaml, rest) = if let Some(rest) = after_first.strip_prefix("---") {
        (String::new(), rest)
    } else if let Some(end_idx) = after_first.find("\n---") {
        (after_first[..end_idx].to_string(), &after_first[end_idx + 4..])
    } else {
        return (None, content.to_string());
    };

    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let body = rest.strip_prefix('\n').unwrap_or(rest).to_string();
    (Some(yaml), body)
}

/// Parse the YAML subset rule files use.
fn parse_simple_yaml(yaml: &str) -> RuleFrontmatter {
    let mut fm = RuleFrontmatter::default();
    let lines: Vec<&str> = yaml.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "name" => fm.name = Some(unquote(value)),
            "description" => fm.description = Some(unquote(value)),
            "globs" => fm.globs = split_patterns(parse_array_value(value, &lines, &mut i)),
            "paths" => fm.paths = split_patterns(parse_array_value(value, &lines, &mut i)),
            "applyTo" | "apply_to" => fm.apply_to = Some(unquote(value)),
            "alwaysApply" | "always_apply" => fm.always_apply = parse_bool(value),
            "trigger" => fm.trigger = Some(unquote(value).to_ascii_lowercase()),
            "type" | "kind" => fm.kind = unquote(value).parse().ok(),
            _ => {}
        }
    }

    fm
}

/// Parse an array value, either inline `[a, b]`, scalar, or multi-line `- item`.
fn parse_array_value(value: &str, lines: &[&str], i: &mut usize) -> Vec<String> {
    if value.starts_with('[') {
        return parse_inline_array(value);
    }

    if !value.is_empty() {
        return vec![unquote(value)];
    }

    let mut items = Vec::new();
    while *i < lines.len() {
        let trimmed = lines[*i].trim();
        if let Some(item) = trimmed.strip_prefix('-') {
            items.push(unquote(item.trim()));
            *i += 1;
        } else {
            break;
        }
    }
    items
}

/// Parse an inline array like `[item1, item2]`.
fn parse_inline_array(value: &str) -> Vec<String> {
    let inner = value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();

    if inner.is_empty() {
        return Vec::new();
    }

    inner.split(',').map(|s| unquote(s.trim())).collect()
}

/// Flatten comma-separated scalars (`globs: a, b`) into single patterns.
fn split_patterns(items: Vec<String>) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.split(','))
        .map(|p| unquote(p.trim()))
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match unquote(value).to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// Remove surrounding quotes from a scalar, undoing `\"` escapes.
fn unquote(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    } else if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        trimmed[1..trimmed.len() - 1].replace("''", "'")
    } else {
        trimmed.to_string()
    }
}

/// Quote a scalar when plain YAML would misread it.
fn scalar(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.contains(": ")
        || value.contains(" #")
        || value.starts_with(|c: char| "[]{}>|*&!%@`'\",#?-".contains(c))
        || value != value.trim();
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Metadata to render into a frontmatter block.
#[derive(Debug, Clone, Copy)]
pub struct FrontmatterFields<'a> {
    /// Description (may be empty).
    pub description: &'a str,
    /// Comma-separated glob scope.
    pub globs: Option<&'a str>,
    /// Tri-state apply flag.
    pub always_apply: Option<bool>,
    /// Section kind.
    pub kind: SectionKind,
}

impl FrontmatterFlavor {
    /// Render the frontmatter block (without delimiters).
    ///
    /// Returns `None` for [`FrontmatterFlavor::Callouts`] and when the flavor
    /// would write nothing at all.
    pub fn render(self, fields: &FrontmatterFields<'_>) -> Option<String> {
        let description = fields.description.trim();
        let globs: Vec<&str> = fields
            .globs
            .map(|g| g.split(',').map(str::trim).filter(|g| !g.is_empty()).collect())
            .unwrap_or_default();
        let always = fields.always_apply.unwrap_or(true);

        let mut lines: Vec<String> = Vec::new();
        match self {
            Self::Callouts => return None,
            Self::Cursor => {
                lines.push(keyed("description", description));
                if globs.is_empty() {
                    lines.push("globs:".to_string());
                } else {
                    lines.push(format!("globs: {}", globs.join(",")));
                }
                lines.push(format!("alwaysApply: {always}"));
            }
            Self::Windsurf => {
                let trigger = match (always, globs.is_empty()) {
                    (true, _) => "always_on",
                    (false, false) => "glob",
                    (false, true) => "model_decision",
                };
                lines.push(format!("trigger: {trigger}"));
                if !always && !globs.is_empty() {
                    lines.push(format!("globs: {}", globs.join(",")));
                }
                if !description.is_empty() {
                    lines.push(keyed("description", description));
                }
            }
            Self::Copilot => {
                if !description.is_empty() {
                    lines.push(keyed("description", description));
                }
                if always {
                    lines.push("applyTo: \"**\"".to_string());
                } else if !globs.is_empty() {
                    lines.push(format!("applyTo: \"{}\"", globs.join(",")));
                } else {
                    lines.push("alwaysApply: false".to_string());
                }
            }
            Self::Claude => {
                if !description.is_empty() {
                    lines.push(keyed("description", description));
                }
                if !always {
                    if globs.is_empty() {
                        lines.push("alwaysApply: false".to_string());
                    } else {
                        lines.push("paths:".to_string());
                        for glob in &globs {
                            lines.push(format!("  - \"{glob}\""));
                        }
                    }
                }
            }
        }

        if fields.kind != SectionKind::Rule {
            lines.push(format!("type: {}", fields.kind));
        }

        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

fn keyed(key: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{key}:")
    } else {
        format!("{key}: {}", scalar(value))
    }
}

impl Section {
    /// Build a section from a rule file on disk.
    ///
    /// Frontmatter is stripped and its metadata adopted; inline callouts in
    /// the body win over it. A description blockquote is only lifted from
    /// files without frontmatter. When neither declares a description one is
    /// derived from the body.
    pub fn from_rule_file(
        name: impl Into<String>,
        directory: Option<String>,
        kind: SectionKind,
        raw: &str,
    ) -> Self {
        let parsed = parse_rule_file(raw);
        let body = parsed.body.trim_start_matches(['\n', '\r']).trim_end();

        let mut section = Section::new(name, body);
        section.directory = directory.filter(|d| !d.is_empty());
        section.kind = parsed.frontmatter.kind.unwrap_or(kind);
        section.globs = parsed.frontmatter.scope();
        section.always_apply = parsed.frontmatter.apply_flag();
        if let Some(description) = parsed.frontmatter.description() {
            section.description = truncate_description(description);
        }

        let inline = if parsed.has_frontmatter {
            extract_callouts(body)
        } else {
            extract_metadata(body)
        };
        inline.apply_to(&mut section);
        if section.description.is_empty() {
            section.description = derive_description(&section.content);
        }
        section
    }
}

/// Wrap a rendered block and body into a complete file.
pub fn with_frontmatter(block: Option<&str>, body: &str) -> String {
    let body = body.trim_end_matches('\n');
    match block {
        Some(block) => format!("---\n{block}\n---\n{body}\n"),
        None => format!("{body}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(description: &'a str, globs: Option<&'a str>, always: Option<bool>) -> FrontmatterFields<'a> {
        FrontmatterFields {
            description,
            globs,
            always_apply: always,
            kind: SectionKind::Rule,
        }
    }

    #[test]
    fn parses_cursor_frontmatter() {
        let raw = "---\ndescription: Testing rules\nglobs: src/**/*.ts, tests/**\nalwaysApply: false\n---\n# Testing\n\nBody";
        let parsed = parse_rule_file(raw);
        assert!(parsed.has_frontmatter);
        assert_eq!(parsed.frontmatter.description(), Some("Testing rules"));
        assert_eq!(parsed.frontmatter.globs, vec!["src/**/*.ts", "tests/**"]);
        assert_eq!(parsed.frontmatter.apply_flag(), Some(false));
        assert_eq!(parsed.body, "# Testing\n\nBody");
    }

    #[test]
    fn parses_windsurf_trigger() {
        let parsed = parse_rule_file("---\ntrigger: always_on\n---\n# A");
        assert_eq!(parsed.frontmatter.apply_flag(), Some(true));
        let parsed = parse_rule_file("---\ntrigger: glob\nglobs: \"*.rs\"\n---\n# A");
        assert_eq!(parsed.frontmatter.apply_flag(), Some(false));
        assert_eq!(parsed.frontmatter.scope().as_deref(), Some("*.rs"));
    }

    #[test]
    fn parses_copilot_apply_to() {
        let parsed = parse_rule_file("---\napplyTo: \"**\"\n---\n# A");
        assert_eq!(parsed.frontmatter.apply_flag(), Some(true));
        assert_eq!(parsed.frontmatter.scope(), None);
        let parsed = parse_rule_file("---\napplyTo: \"src/**,docs/**\"\n---\n# A");
        assert_eq!(parsed.frontmatter.apply_flag(), Some(false));
        assert_eq!(parsed.frontmatter.scope().as_deref(), Some("src/**, docs/**"));
    }

    #[test]
    fn parses_claude_paths_list() {
        let raw = "---\npaths:\n  - \"src/**\"\n  - \"lib/**\"\ntype: skill\n---\n# A";
        let fm = parse_rule_file(raw).frontmatter;
        assert_eq!(fm.paths, vec!["src/**", "lib/**"]);
        assert_eq!(fm.apply_flag(), Some(false));
        assert_eq!(fm.kind, Some(SectionKind::Skill));
    }

    #[test]
    fn no_frontmatter_is_all_body() {
        let parsed = parse_rule_file("# Title\n\nBody");
        assert!(!parsed.has_frontmatter);
        assert_eq!(parsed.body, "# Title\n\nBody");
        assert_eq!(parsed.frontmatter.apply_flag(), None);
    }

    #[test]
    fn unclosed_frontmatter_is_body() {
        let raw = "---\ndescription: x\n# Title";
        let parsed = parse_rule_file(raw);
        assert!(!parsed.has_frontmatter);
        assert_eq!(parsed.body, raw);
    }

    #[test]
    fn horizontal_rule_body_is_not_frontmatter() {
        let raw = "---- \nText";
        assert!(!parse_rule_file(raw).has_frontmatter);
    }

    #[test]
    fn empty_block() {
        let parsed = parse_rule_file("---\n---\n# A\n");
        assert!(parsed.has_frontmatter);
        assert_eq!(parsed.body, "# A\n");
    }

    #[test]
    fn unquote_handles_escapes() {
        assert_eq!(unquote("\"say \\\"hi\\\"\""), "say \"hi\"");
        assert_eq!(unquote("'it''s'"), "it's");
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn scalar_quotes_when_needed() {
        assert_eq!(scalar("plain text"), "plain text");
        assert_eq!(scalar("key: value"), "\"key: value\"");
        assert_eq!(scalar("*.rs"), "\"*.rs\"");
        assert_eq!(scalar("say \"hi\""), "say \"hi\"");
        assert_eq!(scalar("- item"), "\"- item\"");
    }

    #[test]
    fn cursor_always_writes_three_keys() {
        let block = FrontmatterFlavor::Cursor.render(&fields("", None, None)).unwrap();
        assert_eq!(block, "description:\nglobs:\nalwaysApply: true");
        let block = FrontmatterFlavor::Cursor
            .render(&fields("Tests", Some("a/**, b/**"), Some(false)))
            .unwrap();
        assert_eq!(block, "description: Tests\nglobs: a/**,b/**\nalwaysApply: false");
    }

    #[test]
    fn windsurf_triggers() {
        let render = |always, globs| FrontmatterFlavor::Windsurf.render(&fields("", globs, always)).unwrap();
        assert_eq!(render(None, None), "trigger: always_on");
        assert_eq!(render(Some(false), Some("*.rs")), "trigger: glob\nglobs: *.rs");
        assert_eq!(render(Some(false), None), "trigger: model_decision");
    }

    #[test]
    fn copilot_and_claude_scopes() {
        let copilot = FrontmatterFlavor::Copilot.render(&fields("D", None, None)).unwrap();
        assert_eq!(copilot, "description: D\napplyTo: \"**\"");
        let claude = FrontmatterFlavor::Claude.render(&fields("", None, None));
        assert_eq!(claude, None);
        let claude = FrontmatterFlavor::Claude
            .render(&fields("", Some("src/**"), Some(false)))
            .unwrap();
        assert_eq!(claude, "paths:\n  - \"src/**\"");
    }

    #[test]
    fn callouts_flavor_renders_nothing() {
        assert_eq!(FrontmatterFlavor::Callouts.render(&fields("D", None, Some(false))), None);
    }

    #[test]
    fn non_rule_kinds_add_type() {
        let block = FrontmatterFlavor::Claude
            .render(&FrontmatterFields {
                description: "",
                globs: None,
                always_apply: None,
                kind: SectionKind::Command,
            })
            .unwrap();
        assert_eq!(block, "type: command");
    }

    #[test]
    fn render_then_parse_is_stable() {
        let flavors = [
            FrontmatterFlavor::Claude,
            FrontmatterFlavor::Cursor,
            FrontmatterFlavor::Windsurf,
            FrontmatterFlavor::Copilot,
        ];
        for flavor in flavors {
            for (globs, always) in [(None, None), (Some("src/**, *.md"), Some(false)), (None, Some(false))] {
                let input = FrontmatterFields {
                    description: "Key: tricky \"text\"",
                    globs,
                    always_apply: always,
                    kind: SectionKind::Skill,
                };
                let block = flavor.render(&input).unwrap();
                let fm = parse_rule_file(&with_frontmatter(Some(&block), "# A")).frontmatter;
                assert_eq!(fm.description(), Some("Key: tricky \"text\""), "{flavor:?}");
                assert_eq!(fm.scope().as_deref(), globs, "{flavor:?}");
                assert_eq!(fm.apply_flag().unwrap_or(true), always.unwrap_or(true), "{flavor:?}");
                assert_eq!(fm.kind, Some(SectionKind::Skill));
            }
        }
    }

    #[test]
    fn section_from_cursor_file() {
        let raw = "---\ndescription: Test rules\nglobs: tests/**\nalwaysApply: false\n---\n# Testing\n\nRun it.\n";
        let section = Section::from_rule_file("testing", None, SectionKind::Rule, raw);
        assert_eq!(section.content, "# Testing\n\nRun it.");
        assert_eq!(section.description, "Test rules");
        assert_eq!(section.globs.as_deref(), Some("tests/**"));
        assert_eq!(section.always_apply, Some(false));
    }

    #[test]
    fn section_from_callout_file() {
        let raw = "# Deploy\n\n> Ship it\n> [!type] command\n\nSteps.\n";
        let section = Section::from_rule_file("deploy", Some(String::new()), SectionKind::Rule, raw);
        assert_eq!(section.content, "# Deploy\n\nSteps.");
        assert_eq!(section.description, "Ship it");
        assert_eq!(section.kind, SectionKind::Command);
        assert_eq!(section.directory, None);
        assert_eq!(section.always_apply, None);
    }

    #[test]
    fn section_derives_missing_description() {
        let section = Section::from_rule_file("a", Some("web".into()), SectionKind::Skill, "# A\n\nFirst line.");
        assert_eq!(section.description, "First line.");
        assert_eq!(section.kind, SectionKind::Skill);
        assert_eq!(section.directory.as_deref(), Some("web"));
    }

    #[test]
    fn with_frontmatter_wraps_body() {
        assert_eq!(with_frontmatter(Some("a: b"), "# T\n\n"), "---\na: b\n---\n# T\n");
        assert_eq!(with_frontmatter(None, "# T"), "# T\n");
    }
}
