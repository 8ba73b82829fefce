use crate::lexicon::tokenize;
use analysis_core::NewsArticle;
use serde::{Deserialize, Serialize};

/// Driver labels in their fallback order.
pub const DEFAULT_DRIVERS: [&str; 6] = [
    "Earnings performance",
    "Product launches",
    "Management changes",
    "Market competition",
    "Regulatory news",
    "Economic conditions",
];

const MIN_DRIVERS: usize = 3;
const MAX_DRIVERS: usize = 4;

/// Kind of event a headline reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsEventType {
    Earnings,       // Earnings reports, guidance
    MergersAcq,     // M&A, buyouts, spinoffs
    Regulatory,     // FDA, SEC, antitrust
    AnalystAction,  // Upgrades, downgrades, initiations
    Management,     // CEO changes, board reshuffles
    Product,        // Product launches, recalls
    Legal,          // Lawsuits, settlements
    Macro,          // Fed, economic data
    General,        // Catch-all
}

impl NewsEventType {
    /// Driver label for the event, if it moves sentiment on its own.
    pub fn driver(&self) -> Option<&'static str> {
        match self {
            NewsEventType::Earnings => Some(DEFAULT_DRIVERS[0]),
            NewsEventType::Product => Some(DEFAULT_DRIVERS[1]),
            NewsEventType::Management => Some(DEFAULT_DRIVERS[2]),
            NewsEventType::MergersAcq => Some(DEFAULT_DRIVERS[3]),
            NewsEventType::Regulatory | NewsEventType::Legal => Some(DEFAULT_DRIVERS[4]),
            NewsEventType::Macro => Some(DEFAULT_DRIVERS[5]),
            NewsEventType::AnalystAction | NewsEventType::General => None,
        }
    }
}

/// Words of a headline; keywords match whole words or word stems, never
/// the inside of a longer word.
struct Headline<'a> {
    words: Vec<&'a str>,
}

impl<'a> Headline<'a> {
    fn new(text: &'a str) -> Self {
        Self { words: tokenize(text) }
    }

    fn has_word(&self, words: &[&str]) -> bool {
        self.words.iter().any(|w| words.contains(w))
    }

    fn has_stem(&self, stems: &[&str]) -> bool {
        self.words.iter().any(|w| stems.iter().any(|s| w.starts_with(s)))
    }

    /// Consecutive words, each starting with the matching part of `phrase`.
    fn has_phrase(&self, phrase: &str) -> bool {
        let parts: Vec<&str> = phrase.split(' ').collect();
        self.words
            .windows(parts.len())
            .any(|window| window.iter().zip(&parts).all(|(w, p)| w.starts_with(p)))
    }
}

pub fn classify_event(title: &str, description: Option<&str>) -> NewsEventType {
    let text = format!("{} {}", title, description.unwrap_or("")).to_lowercase();
    let h = Headline::new(&text);

    if h.has_stem(&["earnings", "quarterly", "guidance"])
        || h.has_stem(&["revenue"]) && h.has_stem(&["beat", "miss", "report"])
        || h.has_word(&["eps"])
        || h.has_stem(&["profit"]) && h.has_stem(&["quarter"])
    {
        NewsEventType::Earnings
    } else if h.has_stem(&["acqui", "merger", "buyout", "takeover", "competit", "rival"])
        || h.has_phrase("market share")
    {
        NewsEventType::MergersAcq
    } else if h.has_word(&["fda", "sec"]) || h.has_stem(&["regulat", "approval", "antitrust", "compliance"]) {
        NewsEventType::Regulatory
    } else if h.has_stem(&["upgrade", "downgrade", "initiat", "analyst", "rating"]) || h.has_phrase("price target") {
        NewsEventType::AnalystAction
    } else if h.has_stem(&["ceo", "cfo", "board", "executive", "resign", "appoint"]) {
        NewsEventType::Management
    } else if h.has_stem(&["launch", "product", "recall", "patent", "unveil"]) {
        NewsEventType::Product
    } else if h.has_stem(&["lawsuit", "litigation", "settlement", "indictment"]) || h.has_word(&["sued", "court", "courts"]) {
        NewsEventType::Legal
    } else if h.has_word(&["fed", "gdp"])
        || h.has_phrase("federal reserve")
        || h.has_phrase("interest rate")
        || h.has_stem(&["inflation", "unemployment", "tariff", "recession"])
    {
        NewsEventType::Macro
    } else {
        NewsEventType::General
    }
}

/// Most frequent drivers in the coverage, padded from the defaults so at
/// least three are always reported.
pub fn identify_drivers(articles: &[NewsArticle]) -> Vec<String> {
    let mut counts = [0usize; DEFAULT_DRIVERS.len()];
    for article in articles {
        let event = classify_event(&article.title, article.description.as_deref());
        if let Some(label) = event.driver() {
            if let Some(idx) = DEFAULT_DRIVERS.iter().position(|d| *d == label) {
                counts[idx] += 1;
            }
        }
    }

    let mut ranked: Vec<usize> = (0..DEFAULT_DRIVERS.len()).filter(|i| counts[*i] > 0).collect();
    // stable sort keeps default order on ties
    ranked.sort_by(|a, b| counts[*b].cmp(&counts[*a]));
    ranked.truncate(MAX_DRIVERS);

    let mut drivers: Vec<String> = ranked.iter().map(|i| DEFAULT_DRIVERS[*i].to_string()).collect();
    for label in DEFAULT_DRIVERS {
        if drivers.len() >= MIN_DRIVERS {
            break;
        }
        if !drivers.iter().any(|d| d == label) {
            drivers.push(label.to_string());
        }
    }
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            id: title.to_string(),
            title: title.to_string(),
            author: None,
            source: None,
            published_utc: Utc::now(),
            article_url: String::new(),
            description: None,
            keywords: vec![],
            tickers: vec![],
        }
    }

    #[test]
    fn test_classify_event() {
        assert_eq!(classify_event("Apple quarterly earnings top estimates", None), NewsEventType::Earnings);
        assert_eq!(classify_event("Microsoft completes acquisition", None), NewsEventType::MergersAcq);
        assert_eq!(classify_event("FDA grants approval", None), NewsEventType::Regulatory);
        assert_eq!(classify_event("Analyst raises price target", None), NewsEventType::AnalystAction);
        assert_eq!(classify_event("CEO to resign", None), NewsEventType::Management);
        assert_eq!(classify_event("Company unveils new phone", Some("launch event")), NewsEventType::Product);
        assert_eq!(classify_event("Shareholders file lawsuit", None), NewsEventType::Legal);
        assert_eq!(classify_event("Federal Reserve holds rates", None), NewsEventType::Macro);
        assert_eq!(classify_event("Company hosts picnic", None), NewsEventType::General);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        assert_eq!(classify_event("Five steps to a cleaner dashboard", None), NewsEventType::General);
        assert_eq!(classify_event("Keyboard makers prep for the holidays", None), NewsEventType::General);
        assert_eq!(classify_event("EPS tops estimates", None), NewsEventType::Earnings);
        assert_eq!(classify_event("Board names new chair", None), NewsEventType::Management);
        assert_eq!(classify_event("Apple's CEO visits Beijing", None), NewsEventType::Management);
        assert_eq!(classify_event("Rivals fight over market shares", None), NewsEventType::MergersAcq);

        let drivers = identify_drivers(&[article("Five steps to a cleaner dashboard")]);
        assert_eq!(drivers, vec!["Earnings performance", "Product launches", "Management changes"]);
    }

    #[test]
    fn test_drivers_ranked_by_frequency() {
        let articles = vec![
            article("New product launch draws crowds"),
            article("Second product launch this year"),
            article("Federal Reserve signals cuts"),
            article("Quarterly earnings preview"),
            article("Product recall announced"),
            article("Inflation data due"),
            article("CEO interview"),
            article("Regulators probe pricing"),
        ];
        let drivers = identify_drivers(&articles);

        assert_eq!(
            drivers,
            vec![
                "Product launches",
                "Economic conditions",
                "Earnings performance",
                "Management changes",
            ]
        );
    }

    #[test]
    fn test_padded_from_defaults() {
        let drivers = identify_drivers(&[article("Competitors gain market share")]);
        assert_eq!(
            drivers,
            vec!["Market competition", "Earnings performance", "Product launches"]
        );

        let drivers = identify_drivers(&[]);
        assert_eq!(drivers.len(), 3);
        assert_eq!(drivers[0], "Earnings performance");
    }

    #[test]
    fn test_unmapped_events_ignored() {
        let drivers = identify_drivers(&[article("Analyst downgrade"), article("Weekend open house")]);
        assert_eq!(
            drivers,
            vec!["Earnings performance", "Product launches", "Management changes"]
        );
    }
}
