//! Awards feed classification.
//!
//! Turns a spreadsheet list feed (one entry per award category, with
//! `gsx$nominee1`..`gsx$nominee9` and `gsx$winner` columns) into the
//! `awards.json` document consumed by the live page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;

/// Highest nominee column index in the feed.
const MAX_NOMINEES: usize = 9;

/// JSONP wrapper the feed is served with.
const JSONP_PREFIX: &str = "gdata.io.handleScriptLoaded(";
const JSONP_SUFFIX: &str = ");";

/// A single nominee within an award category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nominee {
    pub title: String,
    pub winner: bool,
}

/// An award category and its nominees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub award: String,
    pub nominees: Vec<Nominee>,
    pub has_winner: bool,
}

/// Awards split by whether a winner has been announced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AwardsDocument {
    pub with_winners: Vec<Award>,
    pub without_winners: Vec<Award>,
}

impl AwardsDocument {
    /// Serialize to compact JSON text.
    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Whether `nominee` is marked as the winner given the feed's winner cell.
///
/// A nominee wins when the winner cell equals it or merely contains it.
/// The containment rule means "Bob Smith" also wins when the cell reads
/// "Bob Smithson".
#[must_use]
pub fn is_winner(nominee: &str, winner_cell: &str) -> bool {
    winner_cell == nominee || winner_cell.contains(nominee)
}

/// Parse and classify a feed, with or without its JSONP wrapper.
pub fn parse_feed(text: &str) -> Result<AwardsDocument, DataError> {
    let value: Value = serde_json::from_str(strip_jsonp(text))?;

    let entries = value
        .get("feed")
        .and_then(|feed| feed.get("entry"))
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::Feed("missing feed.entry array".to_owned()))?;

    let mut document = AwardsDocument::default();
    for (index, entry) in entries.iter().enumerate() {
        let award = classify_entry(entry)
            .ok_or_else(|| DataError::Feed(format!("entry {index} has no title.$t")))?;

        if award.has_winner {
            document.with_winners.push(award);
        } else {
            document.without_winners.push(award);
        }
    }

    tracing::debug!(
        with_winners = document.with_winners.len(),
        without_winners = document.without_winners.len(),
        "Classified awards feed"
    );
    Ok(document)
}

fn classify_entry(entry: &Value) -> Option<Award> {
    let title = cell(entry, "title")?;
    let winner_cell = cell(entry, "gsx$winner").unwrap_or_default();

    let nominees: Vec<Nominee> = (1..=MAX_NOMINEES)
        .filter_map(|n| cell(entry, &format!("gsx$nominee{n}")))
        .filter(|nominee| !nominee.is_empty())
        .map(|nominee| Nominee {
            winner: is_winner(nominee, winner_cell),
            title: nominee.to_owned(),
        })
        .collect();

    Some(Award {
        award: title.to_owned(),
        has_winner: nominees.iter().any(|n| n.winner),
        nominees,
    })
}

/// Text of a `{"$t": "..."}` cell.
fn cell<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key)?.get("$t")?.as_str()
}

fn strip_jsonp(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix(JSONP_PREFIX)
        .and_then(|rest| rest.strip_suffix(JSONP_SUFFIX))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn entry(title: &str, nominees: &[&str], winner: &str) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("title".to_owned(), json!({ "$t": title }));
        map.insert("gsx$winner".to_owned(), json!({ "$t": winner }));
        for n in 1..=MAX_NOMINEES {
            let name = nominees.get(n - 1).copied().unwrap_or("");
            map.insert(format!("gsx$nominee{n}"), json!({ "$t": name }));
        }
        Value::Object(map)
    }

    fn feed(entries: Vec<Value>) -> String {
        json!({ "feed": { "entry": entries } }).to_string()
    }

    #[test]
    fn test_exact_winner() {
        let text = feed(vec![entry("Best Picture", &["Argo", "Lincoln"], "Argo")]);
        let doc = parse_feed(&text).unwrap();

        assert!(doc.without_winners.is_empty());
        assert_eq!(
            doc.with_winners,
            vec![Award {
                award: "Best Picture".to_owned(),
                nominees: vec![
                    Nominee {
                        title: "Argo".to_owned(),
                        winner: true
                    },
                    Nominee {
                        title: "Lincoln".to_owned(),
                        winner: false
                    },
                ],
                has_winner: true,
            }]
        );
    }

    #[test]
    fn test_substring_winner_is_flagged() {
        let text = feed(vec![entry(
            "Best Actor",
            &["Bob Smith", "Alan Jones"],
            "Bob Smithson",
        )]);
        let doc = parse_feed(&text).unwrap();

        let award = &doc.with_winners[0];
        assert!(award.nominees[0].winner);
        assert!(!award.nominees[1].winner);
    }

    #[test]
    fn test_no_winner_yet() {
        let text = feed(vec![
            entry("Best Picture", &["Argo"], "Argo"),
            entry("Best Score", &["Life of Pi", "Skyfall"], ""),
        ]);
        let doc = parse_feed(&text).unwrap();

        assert_eq!(doc.with_winners.len(), 1);
        assert_eq!(doc.without_winners.len(), 1);
        assert_eq!(doc.without_winners[0].award, "Best Score");
        assert!(!doc.without_winners[0].has_winner);
    }

    #[test]
    fn test_empty_nominees_skipped() {
        let text = feed(vec![entry("Best Song", &["Skyfall", "", "Suddenly"], "")]);
        let doc = parse_feed(&text).unwrap();
        let titles: Vec<_> = doc.without_winners[0]
            .nominees
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Skyfall", "Suddenly"]);
    }

    #[test]
    fn test_jsonp_wrapper_stripped() {
        let text = format!(
            "gdata.io.handleScriptLoaded({});",
            feed(vec![entry("Best Picture", &["Argo"], "")])
        );
        let doc = parse_feed(&text).unwrap();
        assert_eq!(doc.without_winners.len(), 1);
    }

    #[test]
    fn test_missing_entries_is_error() {
        let err = parse_feed("{\"feed\": {}}").unwrap_err();
        assert!(matches!(err, DataError::Feed(_)));
    }

    #[test]
    fn test_entry_without_title_is_error() {
        let err = parse_feed(&feed(vec![json!({"gsx$winner": {"$t": ""}})])).unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_output_shape() {
        let doc = parse_feed(&feed(vec![entry("Best Picture", &["Argo"], "Argo")])).unwrap();
        let json: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["with_winners"][0]["award"], "Best Picture");
        assert_eq!(json["with_winners"][0]["nominees"][0]["winner"], true);
        assert_eq!(json["without_winners"], json!([]));
    }
}
