//! Cross-reference rewriting.
//!
//! Rule files point at each other with relative links (`./06-testing.mdc`,
//! `../skills/07-review.md`); the composed document uses hash anchors
//! (`#6-testing`). Both directions are keyed purely by section position. Targets the index does not know are left
//! untouched: they may live outside the set being transformed.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static RELATIVE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\]\((?:[\w.-]+/)*(\d{2})-([a-z0-9]+(?:-[a-z0-9]+)*)\.(?:mdc|md)\)")
        .expect("valid relative link regex")
});

static HASH_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\]\(#(\d+)(?:-([a-z0-9]+(?:-[a-z0-9]+)*)|\.[ ]?[^)]*)\)")
        .expect("valid hash link regex")
});

/// Position lookups built for one transformation.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    position_to_filename: HashMap<usize, String>,
    stem_to_position: HashMap<String, usize>,
}

impl SectionIndex {
    /// Index output filenames or layout paths; position `i + 1` for the
    /// `i`th entry.
    ///
    /// Both the full stem (`06-testing`) and the bare slug (`testing`) are
    /// registered, so links written against an older numbering still resolve.
    pub fn from_filenames<I, S>(filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for (i, filename) in filenames.into_iter().enumerate() {
            let position = i + 1;
            let filename = filename.into();
            let stem = file_stem(&filename).to_string();
            let bare = strip_position_prefix(&stem).to_string();
            let _ = index.stem_to_position.entry(bare).or_insert(position);
            let _ = index.stem_to_position.insert(stem, position);
            let _ = index.position_to_filename.insert(position, filename);
        }
        index
    }

    /// Index section names for composition (`NN-name` and `name` keys).
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = Self::default();
        for (i, name) in names.into_iter().enumerate() {
            let position = i + 1;
            let _ = index
                .stem_to_position
                .insert(format!("{position:02}-{name}"), position);
            let _ = index.stem_to_position.entry(name.to_string()).or_insert(position);
        }
        index
    }

    /// Filename-stem → position map.
    pub fn stem_to_position(&self) -> &HashMap<String, usize> {
        &self.stem_to_position
    }

    /// Position → filename (or layout path) map.
    pub fn position_to_filename(&self) -> &HashMap<usize, String> {
        &self.position_to_filename
    }
}

/// Rewrite `./NN-slug.ext` links into `#P-slug` anchors.
///
/// `P` comes from `name_to_position`, looked up by the full stem first and the
/// bare slug second.
pub fn relative_to_hash(text: &str, name_to_position: &HashMap<String, usize>) -> String {
    RELATIVE_LINK_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let slug = &caps[2];
            let stem = format!("{}-{slug}", &caps[1]);
            match name_to_position
                .get(&stem)
                .or_else(|| name_to_position.get(slug))
            {
                Some(position) => format!("](#{position}-{slug})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Rewrite `#N-slug` and `#N. Title` anchors into relative file links.
///
/// Targets are layout paths (`skills/07-review.md`), written relative to
/// `from_dir`, the directory of the file holding `text`.
pub fn hash_to_relative(
    text: &str,
    position_to_path: &HashMap<usize, String>,
    from_dir: &str,
) -> String {
    HASH_LINK_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let target = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|position| position_to_path.get(&position));
            match target {
                Some(target) => format!("]({})", relative_path(from_dir, target)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Path to `target` as seen from the directory `from_dir`.
///
/// Both are `/`-separated and relative to the same root. The result always
/// starts with `./` or `../`.
pub fn relative_path(from_dir: &str, target: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    let to: Vec<&str> = target.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    let (target_dir, file) = to.split_at(to.len().saturating_sub(1));

    let common = from
        .iter()
        .zip(target_dir)
        .take_while(|(a, b)| a == b)
        .count();
    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    if parts.is_empty() {
        parts.push(".");
    }
    parts.extend(&target_dir[common..]);
    parts.extend(file);
    parts.join("/")
}

/// Directory part of a `/`-separated path, `""` for a bare filename.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// `[NN-]slug.ext` filenames for `names`, with `-2`, `-3` suffixes on clashes.
pub fn output_filenames(names: &[&str], extension: &str, numbered: bool) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let prefix = if numbered {
                format!("{:02}-", i + 1)
            } else {
                String::new()
            };
            let mut filename = format!("{prefix}{name}.{extension}");
            let count = seen.entry(filename.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                filename = format!("{prefix}{name}-{count}.{extension}");
                let _ = seen.insert(filename.clone(), 1);
            }
            filename
        })
        .collect()
}

fn file_stem(filename: &str) -> &str {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    base.split_once('.').map_or(base, |(stem, _)| stem)
}

fn strip_position_prefix(stem: &str) -> &str {
    match stem.split_once('-') {
        Some((digits, rest))
            if !digits.is_empty() && !rest.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => stem,
    }
}
