use scraper::{Html, Selector};

use crate::keywords::{AD_BLOCKER_KEYWORDS, CRITICAL_ERROR_KEYWORDS, LOGIN_KEYWORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Ok,
    ParkedOrError,
    NeedsReview(ReviewSignal),
}

/// Which gate triggered a review classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSignal {
    AdBlocker,
    Login,
}

pub trait ContentClassifier: Send + Sync {
    fn classify(&self, html: &str) -> Classification;
}

/// Substring matcher over `<title>` + `<body>` text.
///
/// Lists are checked in order: critical errors first, then ad-blocker walls,
/// then login gates. Phrases are lower-cased on construction; a phrase
/// embedded inside a longer word still matches.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    critical: Vec<String>,
    ad_blocker: Vec<String>,
    login: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(critical: &[&str], ad_blocker: &[&str], login: &[&str]) -> Self {
        Self {
            critical: lowercase_all(critical),
            ad_blocker: lowercase_all(ad_blocker),
            login: lowercase_all(login),
        }
    }

    pub fn classify_text(&self, text: &str) -> Classification {
        let contains_any = |phrases: &[String]| phrases.iter().any(|p| text.contains(p.as_str()));

        if contains_any(&self.critical) {
            Classification::ParkedOrError
        } else if contains_any(&self.ad_blocker) {
            Classification::NeedsReview(ReviewSignal::AdBlocker)
        } else if contains_any(&self.login) {
            Classification::NeedsReview(ReviewSignal::Login)
        } else {
            Classification::Ok
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(CRITICAL_ERROR_KEYWORDS, AD_BLOCKER_KEYWORDS, LOGIN_KEYWORDS)
    }
}

impl ContentClassifier for KeywordClassifier {
    fn classify(&self, html: &str) -> Classification {
        self.classify_text(&page_text(html))
    }
}

/// Lower-cased `title + " " + body` text. The parser recovers from malformed
/// markup, so this never fails.
pub fn page_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let first_text = |tag: &str| -> String {
        let Ok(selector) = Selector::parse(tag) else {
            return String::new();
        };
        let text = doc
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        text.to_lowercase()
    };

    let title = first_text("title");
    let body = first_text("body");
    format!("{title} {body}")
}

fn lowercase_all(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_lowercase()).collect()
}
