use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[^\w\s()]").ok());
static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Which rule resolved a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Byte-for-byte equal.
    Exact,
    /// Equal after normalization.
    Normalized,
    /// One normalized name contains the other.
    Contains,
}

/// A catalog entry chosen for a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMatch {
    /// Catalog name to pass to the capture subsystem.
    pub name: String,
    /// Rule that produced the match.
    pub tier: MatchTier,
}

/// Fold a device name into a comparable form.
///
/// Lowercases, spells out registered/trademark/copyright glyphs, separates a
/// parenthesised suffix from the preceding word, strips everything except
/// word characters, whitespace and parentheses, then collapses whitespace.
///
/// ```
/// use framecast_core::normalize_device_name;
///
/// assert_eq!(normalize_device_name("Logi Webcam®"), "logi webcam (r)");
/// assert_eq!(normalize_device_name("Logi  Webcam (R)"), "logi webcam (r)");
/// ```
pub fn normalize_device_name(name: &str) -> String {
    let mut spelled = String::with_capacity(name.len() + 8);
    for c in name.to_lowercase().chars() {
        let replacement = match c {
            '®' => Some("(r)"),
            '™' => Some("(tm)"),
            '©' => Some("(c)"),
            _ => None,
        };
        let starts_group = replacement.is_some() || c == '(';
        if starts_group && spelled.chars().last().is_some_and(|p| !p.is_whitespace()) {
            spelled.push(' ');
        }
        match replacement {
            Some(text) => spelled.push_str(text),
            None => spelled.push(c),
        }
    }

    let stripped = match DISALLOWED.as_ref() {
        Some(re) => re.replace_all(&spelled, "").into_owned(),
        None => spelled,
    };
    let collapsed = match WHITESPACE.as_ref() {
        Some(re) => re.replace_all(&stripped, " ").into_owned(),
        None => stripped.split_whitespace().collect::<Vec<_>>().join(" "),
    };
    collapsed.trim().to_string()
}

/// Resolve `label` against catalog `candidates`.
///
/// Tiers are tried in order across the whole catalog: exact, normalized
/// equality, then containment in either direction. Within a tier the first
/// candidate in catalog order wins.
pub fn match_device(label: &str, candidates: &[String]) -> Option<DeviceMatch> {
    if let Some(name) = candidates.iter().find(|c| c.as_str() == label) {
        return Some(DeviceMatch {
            name: name.clone(),
            tier: MatchTier::Exact,
        });
    }

    let wanted = normalize_device_name(label);
    if wanted.is_empty() {
        return None;
    }

    let normalized: Vec<(&String, String)> = candidates
        .iter()
        .map(|c| (c, normalize_device_name(c)))
        .collect();

    if let Some((name, _)) = normalized.iter().find(|(_, n)| *n == wanted) {
        return Some(DeviceMatch {
            name: (*name).clone(),
            tier: MatchTier::Normalized,
        });
    }

    normalized
        .iter()
        .find(|(_, n)| !n.is_empty() && (n.contains(&wanted) || wanted.contains(n.as_str())))
        .map(|(name, _)| DeviceMatch {
            name: (*name).clone(),
            tier: MatchTier::Contains,
        })
}
