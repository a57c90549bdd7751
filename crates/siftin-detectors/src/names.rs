use crate::Result;
use crate::dom::PageDom;
use lazy_static::lazy_static;
use regex::Regex;

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 50;

/// UI labels that show up in the same places a name does
const BOILERPLATE: &[&str] = &[
    "settings",
    "notifications",
    "home",
    "me",
    "messaging",
    "jobs",
    "my network",
    "network",
    "feed",
    "linkedin",
    "view profile",
    "profile",
    "sign out",
    "sign in",
    "join now",
    "search",
    "post",
    "premium",
    "try premium for free",
    "for business",
    "learning",
    "photo",
];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref TITLE_COUNTER: Regex = Regex::new(r"^\(\d+\+?\)\s*").unwrap();
}

/// How a candidate name is read from matching elements
#[derive(Debug, Clone, Copy)]
enum Read {
    Text,
    Attr(&'static str),
    ViewProfileLabel,
}

/// Ordered name sources: explicit headings, then aria-labels, then profile/menu links
const STRATEGIES: &[(&str, Read)] = &[
    ("h1.text-heading-xlarge", Read::Text),
    ("h1[data-anonymize='person-name']", Read::Text),
    (".profile-card-name", Read::Text),
    (".feed-identity-module__actor-meta .t-16", Read::Text),
    (".global-nav__me-name", Read::Text),
    ("[aria-label*='View profile of']", Read::ViewProfileLabel),
    ("[aria-label*='view profile of']", Read::ViewProfileLabel),
    ("img.global-nav__me-photo", Read::Attr("alt")),
    (".feed-identity-module img", Read::Attr("alt")),
    ("a[href*='/in/']", Read::Text),
    (".global-nav__me", Read::Text),
];

/// Best-effort display name extraction for a logged-in page
pub(crate) struct NameExtractor;

impl NameExtractor {
    pub(crate) fn extract(dom: &PageDom, title: Option<&str>) -> Result<Option<String>> {
        for (selector, read) in STRATEGIES {
            for element in dom.select_all(selector)? {
                let candidate = match read {
                    Read::Text => Some(element.text().collect::<Vec<_>>().join(" ")),
                    Read::Attr(attr) => element.value().attr(attr).map(str::to_string),
                    Read::ViewProfileLabel => element
                        .value()
                        .attr("aria-label")
                        .and_then(name_from_profile_label),
                };

                if let Some(name) = candidate.as_deref().and_then(clean_name) {
                    tracing::debug!("Extracted user name via '{}'", selector);
                    return Ok(Some(name));
                }
            }
        }

        if let Some(name) = title.and_then(name_from_title) {
            tracing::debug!("Extracted user name from page title");
            return Ok(Some(name));
        }

        Ok(None)
    }
}

/// Whether `name` passes the boilerplate and length filter as-is
pub fn is_valid_name(name: &str) -> bool {
    clean_name(name).as_deref() == Some(name)
}

fn clean_name(raw: &str) -> Option<String> {
    let name = WHITESPACE.replace_all(raw.trim(), " ").to_string();
    let chars = name.chars().count();

    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&chars) {
        return None;
    }

    let lower = name.to_lowercase();
    if BOILERPLATE.contains(&lower.as_str()) {
        return None;
    }

    Some(name)
}

fn name_from_profile_label(label: &str) -> Option<String> {
    let lower = label.to_lowercase();
    let start = lower.find("view profile of")? + "view profile of".len();
    // Lowercasing can shift byte offsets for non-ASCII text
    let rest = label.get(start..)?;
    let name = rest.split(',').next().unwrap_or(rest);
    Some(name.trim().to_string())
}

fn name_from_title(title: &str) -> Option<String> {
    let stripped = TITLE_COUNTER.replace(title.trim(), "");
    let name = stripped.strip_suffix("| LinkedIn")?.trim();
    clean_name(name)
}
