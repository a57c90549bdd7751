use crate::Result;
use crate::dom::PageDom;
use crate::names::NameExtractor;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use siftin_core::{LoginStatus, PageSnapshot, Source};

/// Minimum summed indicator weight for a logged-in verdict
pub const LOGIN_THRESHOLD: u32 = 3;

const NAV_SELECTORS: &[&str] = &[
    "#global-nav",
    ".global-nav",
    "nav[aria-label='Primary Navigation']",
    "nav[aria-label='Primary']",
];

// URL fragments LinkedIn redirects to when the session is gone
const AUTH_WALL_PATHS: &[&str] = &["/login", "/uas/login", "/checkpoint", "challenge", "/authwall"];

lazy_static! {
    static ref SIGN_IN_TEXT: Regex = Regex::new(r"(?i)\b(sign\s+in|join\s+now)\b").unwrap();
    static ref ME_TEXT: Regex = Regex::new(r"\bMe\b").unwrap();
}

/// What a positive indicator looks for
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// Any of these selectors matches
    Selector(&'static [&'static str]),
    /// A standalone "Me" label with no sign-in text on the page
    MeText,
}

#[derive(Debug, Clone, Copy)]
pub struct Indicator {
    pub name: &'static str,
    pub weight: u32,
    pub signal: Signal,
}

pub const INDICATORS: [Indicator; 8] = [
    Indicator {
        name: "messaging",
        weight: 1,
        signal: Signal::Selector(&["a[href*='/messaging']"]),
    },
    Indicator {
        name: "notifications",
        weight: 1,
        signal: Signal::Selector(&["a[href*='/notifications']"]),
    },
    Indicator {
        name: "jobs",
        weight: 1,
        signal: Signal::Selector(&["a[href*='/jobs']"]),
    },
    Indicator {
        name: "network",
        weight: 1,
        signal: Signal::Selector(&["a[href*='/mynetwork']"]),
    },
    Indicator {
        name: "post_composer",
        weight: 1,
        signal: Signal::Selector(&[
            ".share-box-feed-entry__trigger",
            "button[aria-label*='Start a post']",
            ".share-box",
        ]),
    },
    Indicator {
        name: "profile_card",
        weight: 1,
        signal: Signal::Selector(&[
            ".feed-identity-module",
            ".profile-card",
            "img.global-nav__me-photo",
        ]),
    },
    Indicator {
        name: "feed_container",
        weight: 1,
        signal: Signal::Selector(&[
            "[data-test-id='feed-container']",
            ".feed-container",
            ".scaffold-finite-scroll__content",
        ]),
    },
    Indicator {
        name: "me_text",
        weight: 1,
        signal: Signal::MeText,
    },
];

/// Detector verdict plus the indicators that fired
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub logged_in: bool,
    pub user_name: Option<String>,
    pub score: u32,
    pub matched: Vec<&'static str>,
}

impl Detection {
    fn logged_out() -> Self {
        Self::default()
    }

    pub fn into_status(self) -> LoginStatus {
        LoginStatus::new(self.logged_in, self.user_name, Source::LocalHeuristic)
    }
}

/// Weighted-indicator login heuristic for LinkedIn pages
pub struct LoginDetector {
    indicators: Vec<Indicator>,
    threshold: u32,
}

impl Default for LoginDetector {
    fn default() -> Self {
        Self::new(INDICATORS.to_vec(), LOGIN_THRESHOLD)
    }
}

impl LoginDetector {
    pub fn new(indicators: Vec<Indicator>, threshold: u32) -> Self {
        Self {
            indicators,
            threshold,
        }
    }

    /// Decide whether the snapshot shows a logged-in session.
    ///
    /// Never fails: any error while inspecting the page yields a logged-out
    /// verdict with no name.
    pub fn detect(&self, snapshot: &PageSnapshot) -> Detection {
        match self.try_detect(snapshot) {
            Ok(detection) => {
                tracing::info!(
                    "LinkedIn login detection: logged_in={} score={}/{}",
                    detection.logged_in,
                    detection.score,
                    self.threshold
                );
                detection
            }
            Err(e) => {
                tracing::warn!("Login detection failed, assuming logged out: {}", e);
                Detection::logged_out()
            }
        }
    }

    fn try_detect(&self, snapshot: &PageSnapshot) -> Result<Detection> {
        if let Some(url) = snapshot.url.as_deref() {
            if is_auth_wall(url) {
                tracing::debug!("Page is an auth wall: {}", url);
                return Ok(Detection::logged_out());
            }
        }

        let dom = PageDom::parse(&snapshot.html);

        // Definitive logged-out signal, short-circuits everything else
        if SIGN_IN_TEXT.is_match(dom.text()) {
            tracing::debug!("Sign-in text present");
            return Ok(Detection::logged_out());
        }

        if !dom.has_any(NAV_SELECTORS)? {
            tracing::debug!("No primary navigation element");
            return Ok(Detection::logged_out());
        }

        let mut score = 0;
        let mut matched = Vec::new();
        for indicator in &self.indicators {
            if Self::evaluate(&dom, &indicator.signal)? {
                score += indicator.weight;
                matched.push(indicator.name);
            }
        }
        tracing::debug!("Indicators matched: {:?}", matched);

        let logged_in = score >= self.threshold;
        let user_name = if logged_in {
            let title = snapshot.title.clone().or_else(|| dom.title());
            NameExtractor::extract(&dom, title.as_deref())?
        } else {
            None
        };

        Ok(Detection {
            logged_in,
            user_name,
            score,
            matched,
        })
    }

    fn evaluate(dom: &PageDom, signal: &Signal) -> Result<bool> {
        match signal {
            Signal::Selector(selectors) => dom.has_any(selectors),
            Signal::MeText => {
                Ok(ME_TEXT.is_match(dom.text()) && !SIGN_IN_TEXT.is_match(dom.text()))
            }
        }
    }
}

fn is_auth_wall(url: &str) -> bool {
    let lower = url.to_lowercase();
    AUTH_WALL_PATHS.iter().any(|path| lower.contains(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: &str = r#"<nav class="global-nav" aria-label="Primary Navigation"></nav>"#;
    const SIGN_IN: &str = r#"<a href="/login">Sign in</a>"#;

    // One snippet per entry of INDICATORS, each firing only its own indicator
    const SNIPPETS: [&str; 8] = [
        r#"<a href="/messaging/">Messaging</a>"#,
        r#"<a href="/notifications/">Notifications</a>"#,
        r#"<a href="/jobs/">Jobs</a>"#,
        r#"<a href="/mynetwork/">My Network</a>"#,
        r#"<button class="share-box-feed-entry__trigger">Start a post</button>"#,
        r#"<div class="feed-identity-module"></div>"#,
        r#"<div class="scaffold-finite-scroll__content"></div>"#,
        r#"<span class="global-nav__me-label">Me</span>"#,
    ];

    fn page(parts: &[&str]) -> PageSnapshot {
        PageSnapshot::new(format!(
            "<html><head><title>Feed | LinkedIn</title></head><body>{}</body></html>",
            parts.concat()
        ))
    }

    fn page_with_mask(mask: u8, extra: &[&str]) -> PageSnapshot {
        let mut parts: Vec<&str> = extra.to_vec();
        for (i, snippet) in SNIPPETS.iter().enumerate() {
            if mask & (1 << i) != 0 {
                parts.push(snippet);
            }
        }
        page(&parts)
    }

    #[test]
    fn test_each_snippet_fires_exactly_its_indicator() {
        let detector = LoginDetector::default();
        for (i, indicator) in INDICATORS.iter().enumerate() {
            let detection = detector.detect(&page_with_mask(1 << i, &[NAV]));
            assert_eq!(detection.matched, vec![indicator.name]);
        }
    }

    #[test]
    fn test_threshold_over_every_indicator_combination() {
        let detector = LoginDetector::default();
        for mask in 0..=u8::MAX {
            let detection = detector.detect(&page_with_mask(mask, &[NAV]));
            let expected = mask.count_ones() >= LOGIN_THRESHOLD;
            assert_eq!(detection.logged_in, expected, "mask {:08b}", mask);
            assert_eq!(detection.score, mask.count_ones());
        }
    }

    #[test]
    fn test_sign_in_text_always_wins() {
        let detector = LoginDetector::default();
        for mask in [0b1111_1111u8, 0b0000_0111, 0b1010_1010] {
            let detection = detector.detect(&page_with_mask(mask, &[NAV, SIGN_IN]));
            assert!(!detection.logged_in);
            assert!(detection.matched.is_empty());
        }

        let join = detector.detect(&page_with_mask(0xff, &[NAV, "<button>JOIN NOW</button>"]));
        assert!(!join.logged_in);
    }

    #[test]
    fn test_wrapped_sign_in_text_wins() {
        let detector = LoginDetector::default();
        let variants = [
            "<a href=\"/login\">\n    Sign\n    in\n  </a>",
            "<span>Join</span> <span>now</span>",
            "<span>Join</span><span>now</span>",
            "<a href=\"/login\">Sign&nbsp;in</a>",
            "<button>JOIN\tNOW</button>",
        ];

        for variant in variants {
            let detection = detector.detect(&page_with_mask(0b0000_0111, &[NAV, variant]));
            assert!(!detection.logged_in, "{:?}", variant);
            assert!(detection.matched.is_empty(), "{:?}", variant);
        }
    }

    #[test]
    fn test_missing_nav_forces_logged_out() {
        let detection = LoginDetector::default().detect(&page_with_mask(0xff, &[]));
        assert!(!detection.logged_in);
        assert_eq!(detection.score, 0);
    }

    #[test]
    fn test_auth_wall_url_is_logged_out() {
        let snapshot = page_with_mask(0xff, &[NAV])
            .with_url("https://www.linkedin.com/checkpoint/challenge/abc");
        assert!(!LoginDetector::default().detect(&snapshot).logged_in);

        let feed = page_with_mask(0xff, &[NAV]).with_url("https://www.linkedin.com/feed/");
        assert!(LoginDetector::default().detect(&feed).logged_in);
    }

    #[test]
    fn test_logged_in_page_extracts_name() {
        let snapshot = page(&[
            NAV,
            SNIPPETS[0],
            SNIPPETS[1],
            SNIPPETS[2],
            r#"<a aria-label="View profile of Jane Doe" href="/in/jane-doe/"></a>"#,
        ]);

        let detection = LoginDetector::default().detect(&snapshot);
        assert!(detection.logged_in);
        assert_eq!(detection.user_name.as_deref(), Some("Jane Doe"));

        let status = detection.into_status();
        assert_eq!(status.source(), Source::LocalHeuristic);
        assert_eq!(status.user_name(), Some("Jane Doe"));
    }

    #[test]
    fn test_logged_out_page_has_no_name() {
        let snapshot = page(&[
            NAV,
            SNIPPETS[0],
            r#"<h1 class="text-heading-xlarge">Jane Doe</h1>"#,
        ]);
        let detection = LoginDetector::default().detect(&snapshot);
        assert!(!detection.logged_in);
        assert_eq!(detection.user_name, None);
    }

    #[test]
    fn test_script_text_does_not_trigger_sign_in() {
        let snapshot = page_with_mask(
            0b0000_0111,
            &[NAV, r#"<script>window.i18n = {"signIn": "Sign in"};</script>"#],
        );
        assert!(LoginDetector::default().detect(&snapshot).logged_in);
    }

    #[test]
    fn test_selector_failure_degrades_to_logged_out() {
        let broken = Indicator {
            name: "broken",
            weight: 5,
            signal: Signal::Selector(&["a[href"]),
        };
        let detector = LoginDetector::new(vec![broken], 1);

        let detection = detector.detect(&page(&[NAV]));
        assert_eq!(detection, Detection::default());
    }
}
