//! Topic configuration: raw `[[topics]]` tables and their validation

use chrono::NaiveDate;
use paperwatch_core::{DateRange, KeywordFilter, PipelineError, Topic};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// One keyword filter as written in the config file.
///
/// A bare string is a case-insensitive substring match; the table form can
/// ask for whole-word matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    Plain(String),
    Detailed {
        pattern: String,
        #[serde(default)]
        whole_word: bool,
    },
}

impl FilterSpec {
    fn pattern(&self) -> &str {
        match self {
            Self::Plain(p) | Self::Detailed { pattern: p, .. } => p,
        }
    }

    fn to_filter(&self) -> KeywordFilter {
        match self {
            Self::Plain(p) => KeywordFilter::substring(p.as_str()),
            Self::Detailed {
                pattern,
                whole_word: true,
            } => KeywordFilter::whole_word(pattern.as_str()),
            Self::Detailed { pattern, .. } => KeywordFilter::substring(pattern.as_str()),
        }
    }
}

/// A `[[topics]]` table before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
    pub name: String,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// Inclusive lower bound, YYYY-MM-DD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Inclusive upper bound, YYYY-MM-DD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Parse a YYYY-MM-DD date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

/// Parse optional bounds into a range, pushing problems onto `problems`.
fn parse_range(
    label: &str,
    start: Option<&str>,
    end: Option<&str>,
    problems: &mut Vec<String>,
) -> Option<DateRange> {
    let mut parse = |field: &str, value: Option<&str>| -> Option<NaiveDate> {
        let value = value?;
        match parse_date(value) {
            Ok(d) => Some(d),
            Err(e) => {
                problems.push(format!("{label}: {field}: {e}"));
                None
            }
        }
    };
    let start_date = parse("start", start);
    let end_date = parse("end", end);
    if let (Some(s), Some(e)) = (start_date, end_date) {
        if s > e {
            problems.push(format!("{label}: start {s} is after end {e}"));
            return None;
        }
    }
    let range = DateRange::new(start_date, end_date);
    (!range.is_unbounded()).then_some(range)
}

/// Validate the configured topics.
///
/// Every problem found is reported in a single
/// [`PipelineError::ConfigInvalid`]; nothing is returned partially.
pub fn validate_topics(specs: &[TopicSpec]) -> Result<Vec<Topic>, PipelineError> {
    if specs.is_empty() {
        return Err(PipelineError::ConfigInvalid("no topics configured".into()));
    }

    let mut problems = Vec::new();
    let mut seen = FxHashSet::default();
    let mut topics = Vec::with_capacity(specs.len());

    for (idx, spec) in specs.iter().enumerate() {
        let name = spec.name.trim();
        let label = if name.is_empty() {
            problems.push(format!("topic #{}: empty name", idx + 1));
            format!("topic #{}", idx + 1)
        } else {
            if !seen.insert(name.to_string()) {
                problems.push(format!("topic '{name}': duplicate name"));
            }
            format!("topic '{name}'")
        };

        if spec.filters.is_empty() {
            problems.push(format!("{label}: at least one keyword filter is required"));
        }
        if spec.filters.iter().any(|f| f.pattern().trim().is_empty()) {
            problems.push(format!("{label}: blank keyword filter"));
        }

        let date_range = parse_range(&label, spec.start.as_deref(), spec.end.as_deref(), &mut problems);

        topics.push(Topic {
            name: name.to_string(),
            filters: spec.filters.iter().map(FilterSpec::to_filter).collect(),
            date_range,
        });
    }

    if problems.is_empty() {
        Ok(topics)
    } else {
        Err(PipelineError::ConfigInvalid(problems.join("; ")))
    }
}

/// Validate an explicit refresh window (either bound optional).
///
/// Returns `None` when neither bound is given.
pub fn validate_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateRange>, PipelineError> {
    let mut problems = Vec::new();
    let range = parse_range("refresh window", start, end, &mut problems);
    if problems.is_empty() {
        Ok(range)
    } else {
        Err(PipelineError::ConfigInvalid(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        topics: Vec<TopicSpec>,
    }

    fn parse(toml_str: &str) -> Vec<TopicSpec> {
        toml::from_str::<Wrapper>(toml_str).unwrap().topics
    }

    #[test]
    fn parse_plain_and_detailed_filters() {
        let specs = parse(
            r#"
[[topics]]
name = "llm-agents"
filters = ["agent", { pattern = "tool use", whole_word = true }]
start = "2023-01-01"
"#,
        );
        let topics = validate_topics(&specs).unwrap();
        assert_eq!(topics.len(), 1);
        let t = &topics[0];
        assert_eq!(t.name, "llm-agents");
        assert_eq!(t.filters.len(), 2);
        assert!(!t.filters[0].is_whole_word());
        assert!(t.filters[1].is_whole_word());
        assert_eq!(t.filters[1].pattern(), "tool use");
        let range = t.date_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(range.end, None);
    }

    #[test]
    fn no_dates_means_no_range() {
        let specs = parse(
            r#"
[[topics]]
name = "slam"
filters = ["SLAM"]
"#,
        );
        let topics = validate_topics(&specs).unwrap();
        assert!(topics[0].date_range.is_none());
    }

    #[test]
    fn rejects_empty_topic_list() {
        let err = validate_topics(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid(_)));
    }

    #[test]
    fn rejects_topic_without_filters() {
        let specs = parse(
            r#"
[[topics]]
name = "empty"
filters = []
"#,
        );
        let err = validate_topics(&specs).unwrap_err();
        assert!(err.to_string().contains("at least one keyword filter"));
    }

    #[test]
    fn rejects_inverted_range() {
        let specs = parse(
            r#"
[[topics]]
name = "nerf"
filters = ["NeRF"]
start = "2024-02-01"
end = "2024-01-01"
"#,
        );
        let err = validate_topics(&specs).unwrap_err();
        assert!(err.to_string().contains("after end"));
    }

    #[test]
    fn reports_all_problems_at_once() {
        let specs = parse(
            r#"
[[topics]]
name = "a"
filters = ["x"]
start = "2024-13-01"

[[topics]]
name = "a"
filters = ["  "]
"#,
        );
        let msg = validate_topics(&specs).unwrap_err().to_string();
        assert!(msg.contains("invalid date"));
        assert!(msg.contains("duplicate name"));
        assert!(msg.contains("blank keyword filter"));
    }

    #[test]
    fn equal_bounds_are_valid() {
        let specs = parse(
            r#"
[[topics]]
name = "one-day"
filters = ["x"]
start = "2024-01-01"
end = "2024-01-01"
"#,
        );
        assert!(validate_topics(&specs).is_ok());
    }

    #[test]
    fn window_validation() {
        assert_eq!(validate_window(None, None).unwrap(), None);
        let w = validate_window(Some("2023-03-01"), Some("2023-03-31"))
            .unwrap()
            .unwrap();
        assert!(w.contains(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()));
        assert!(validate_window(Some("2023-04-01"), Some("2023-03-01")).is_err());
        assert!(validate_window(Some("March"), None).is_err());
    }
}
