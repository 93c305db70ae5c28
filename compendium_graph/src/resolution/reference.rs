//! Cross-reference parsing for wikilink-style note links.

use compendium_model::file_stem_name;

/// Extract the bare target name from a cross-reference.
///
/// Accepts `[[Folder/Target|Alias]]`, `[[Target#Heading]]`, embeds
/// (`![[Target]]`) and bare path-like strings such as `Folder/Target.md`.
/// Unbalanced brackets are trimmed best-effort. Returns `None` when nothing
/// usable remains.
pub fn parse_reference(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }

    let target = strip_brackets(value);
    let target = target.split('|').next().unwrap_or(target);
    let target = target.split('#').next().unwrap_or(target);

    let name = file_stem_name(target.trim());
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn strip_brackets(value: &str) -> &str {
    let opened = value
        .strip_prefix("![[")
        .or_else(|| value.strip_prefix("[["));

    let inner = match opened {
        // Anything after the closing brackets is prose, not part of the link.
        Some(inner) => match inner.find("]]") {
            Some(end) => &inner[..end],
            None => inner,
        },
        None => value,
    };
    inner.trim_matches(|c| c == '[' || c == ']')
}

/// URL slug for a display name: lowercase, word characters and spaces only,
/// runs of spaces collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == ' ')
        .collect();

    kept.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
