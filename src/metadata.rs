//! Front matter data model
//!
//! The block is read once as a YAML mapping. Keys with a typed field are
//! decoded into [`FrontMatter`]; every other key is kept in
//! [`FrontMatter::extra`] so unknown attributes can be reported without a
//! second parse.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::checks::is_recognized_key;

/// Default value of `expiration_in_days`
pub const DEFAULT_EXPIRATION_DAYS: i64 = 365;

/// A date that accepts several literal formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlexibleDate(pub DateTime<Utc>);

/// Naive formats tried after plain dates and RFC 3339, in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Slash-separated date formats: MM/DD/YYYY, then DD/MM/YYYY
const SLASH_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%d/%m/%Y"];

impl FlexibleDate {
    /// Parse a date string; the first format that succeeds wins.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();

        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Some(Self::from_naive_date(date));
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
            return Some(Self(timestamp.with_timezone(&Utc)));
        }
        for format in DATETIME_FORMATS {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(input, format) {
                return Some(Self(timestamp.and_utc()));
            }
        }
        SLASH_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
            .map(Self::from_naive_date)
    }

    fn from_naive_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for FlexibleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        FlexibleDate::parse(&raw).ok_or_else(|| {
            D::Error::custom(format!(
                "unable to parse date {:?}: supported formats are YYYY-MM-DD, RFC3339, etc.",
                raw
            ))
        })
    }
}

impl Serialize for FlexibleDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parsed front matter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(rename = "linkTitle", deserialize_with = "lenient_string")]
    pub link_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owner: Vec<String>,
    pub last_review_date: Option<FlexibleDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub user_questions: Vec<String>,
    pub weight: Option<i64>,
    /// Only presence matters
    pub menu: Option<Value>,
    pub expiration_in_days: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub layout: String,
    #[serde(deserialize_with = "null_as_default")]
    pub toc_hide: bool,
    pub runbook: Option<Runbook>,
    /// Every key without a typed field above
    #[serde(skip)]
    pub extra: BTreeMap<String, Value>,
}

impl FrontMatter {
    /// Keys outside the recognized key set
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.extra
            .keys()
            .map(String::as_str)
            .filter(|key| !is_recognized_key(key))
    }

    pub fn has_menu(&self) -> bool {
        self.menu.is_some()
    }

    pub fn expiration_days(&self) -> i64 {
        self.expiration_in_days.unwrap_or(DEFAULT_EXPIRATION_DAYS)
    }

    pub fn is_runbook_layout(&self) -> bool {
        self.layout == "runbook"
    }
}

/// Keys decoded into the typed fields of [`FrontMatter`]
const TYPED_KEYS: &[&str] = &[
    "title",
    "description",
    "linkTitle",
    "owner",
    "last_review_date",
    "user_questions",
    "weight",
    "menu",
    "expiration_in_days",
    "layout",
    "toc_hide",
    "runbook",
];

/// Decode an extracted front matter block.
///
/// An empty block (or one holding only comments) decodes to the default value.
/// Values under untyped keys are kept as they are, whatever their key or tag.
pub fn parse(block: &str) -> Result<FrontMatter, serde_yaml::Error> {
    let mapping = match serde_yaml::from_str::<Value>(block)? {
        Value::Null => return Ok(FrontMatter::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(serde_yaml::Error::custom(format!(
                "front matter must be a mapping, found {}",
                kind(&other)
            )));
        }
    };

    let mut typed = Mapping::new();
    let mut extra = BTreeMap::new();
    for (key, value) in mapping {
        let is_typed = key.as_str().is_some_and(|name| TYPED_KEYS.contains(&name));
        if is_typed {
            typed.insert(key, value);
        } else {
            extra.insert(key_text(&key), value);
        }
    }

    let mut front_matter: FrontMatter = serde_yaml::from_value(Value::Mapping(typed))?;
    front_matter.extra = extra;
    Ok(front_matter)
}

/// Text form of a mapping key; YAML allows keys that are not strings
fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_else(|_| kind(other).to_string()),
    }
}

/// The `runbook` section of a page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Runbook {
    pub variables: Section<RunbookVariable>,
    pub dashboards: Section<RunbookDashboard>,
    pub known_issues: Section<RunbookKnownIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunbookVariable {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunbookDashboard {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunbookKnownIssue {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
}

/// A list-valued runbook key, decoded leniently so shape problems become findings
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    /// Key missing or null
    Absent,
    Entries(Vec<Entry<T>>),
    /// Present but not a list
    NotAList,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section::Absent
    }
}

impl<T> Section<T> {
    pub fn entries(&self) -> &[Entry<T>] {
        match self {
            Section::Entries(entries) => entries,
            Section::Absent | Section::NotAList => &[],
        }
    }

    /// Successfully decoded entries
    pub fn valid(&self) -> impl Iterator<Item = &T> {
        self.entries().iter().filter_map(|entry| match entry {
            Entry::Valid(item) => Some(item),
            Entry::Malformed(_) => None,
        })
    }
}

/// One element of a runbook list
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    Valid(T),
    /// Not a record, or a field of the wrong type
    Malformed(String),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Section<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let section = match Value::deserialize(deserializer)? {
            Value::Null => Section::Absent,
            Value::Sequence(items) => Section::Entries(
                items
                    .into_iter()
                    .map(|item| {
                        if !item.is_mapping() {
                            return Entry::Malformed(format!(
                                "expected a record, found {}",
                                kind(&item)
                            ));
                        }
                        serde_yaml::from_value(item)
                            .map(Entry::Valid)
                            .unwrap_or_else(|e| Entry::Malformed(e.to_string()))
                    })
                    .collect(),
            ),
            _ => Section::NotAList,
        };
        Ok(section)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a record",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Scalars of any type read as strings; null reads as empty
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a string, found {}",
            kind(&other)
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
