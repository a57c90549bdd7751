use crate::{Error, Result};
use scraper::{ElementRef, Html, Selector};

// Text under these tags is never rendered
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Parsed page with its rendered text precomputed
pub(crate) struct PageDom {
    html: Html,
    text: String,
}

impl PageDom {
    pub(crate) fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        let text = visible_text(&html);
        Self { html, text }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// True if any of `selectors` matches at least one element
    pub(crate) fn has_any(&self, selectors: &[&str]) -> Result<bool> {
        for selector in selectors {
            if self.html.select(&parse_selector(selector)?).next().is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Text of the document `<title>`, for saved pages that carry no separate title
    pub(crate) fn title(&self) -> Option<String> {
        let selector = parse_selector("title").ok()?;
        let title = self.html.select(&selector).next()?.text().collect::<String>();
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    }

    pub(crate) fn select_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        Ok(self.html.select(&parse_selector(selector)?).collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn visible_text(html: &Html) -> String {
    let mut out = String::new();

    for node in html.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_TAGS.contains(&element.name()))
        });

        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }

    // Rendered text: line breaks, indentation and non-breaking spaces all show as one space
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
