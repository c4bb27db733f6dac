//! Reserved words of the query language
//!
//! Matching is case-insensitive: a word is folded to ASCII lower case once
//! and looked up in a single table, so `OCCUR`, `Occur` and `occur` are the
//! same keyword.

use crate::DurationUnit;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! keywords {
    ($($variant:ident => $text:literal,)+) => {
        /// A reserved word
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Keyword {
            $($variant,)+
        }

        impl Keyword {
            /// Every reserved word, in declaration order
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant,)+];

            /// Canonical lower-case spelling
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)+
                }
            }

            fn from_folded(word: &str) -> Option<Self> {
                match word {
                    $($text => Some(Keyword::$variant),)+
                    _ => KEYWORD_ALIASES
                        .iter()
                        .find(|(alias, _)| *alias == word)
                        .map(|(_, keyword)| *keyword),
                }
            }
        }
    };
}

keywords! {
    // Module structure words; reserved but not used by queries
    Data => "data",
    Logic => "logic",
    Action => "action",
    Maintenance => "maintenance",
    Knowledge => "knowledge",
    Library => "library",
    Filename => "filename",
    Mlmname => "mlmname",
    Title => "title",
    Institution => "institution",
    Author => "author",
    Priority => "priority",
    Version => "version",
    Specialist => "specialist",
    Purpose => "purpose",
    Explanation => "explanation",
    Keywords => "keywords",
    Citations => "citations",
    Links => "links",
    Type => "type",
    Date => "date",
    AgeMin => "age_min",
    AgeMax => "age_max",
    Research => "research",
    Http => "http",
    Conclude => "conclude",
    If => "if",
    Then => "then",
    Else => "else",
    Elseif => "elseif",
    Endif => "endif",
    Call => "call",
    With => "with",
    Write => "write",
    Read => "read",
    Let => "let",
    Be => "be",
    It => "it",
    They => "they",
    Event => "event",
    Now => "now",
    At => "at",
    To => "to",
    Any => "any",

    // Operators and phrase words
    And => "and",
    Or => "or",
    Not => "not",
    Is => "is",
    Are => "are",
    Was => "was",
    Were => "were",
    Less => "less",
    Greater => "greater",
    Than => "than",
    Equal => "equal",
    In => "in",
    Where => "where",
    Merge => "merge",
    Sort => "sort",
    Seqto => "seqto",
    From => "from",
    Before => "before",
    After => "after",
    Ago => "ago",
    Within => "within",
    Between => "between",
    Today => "today",
    Past => "past",
    The => "the",
    Of => "of",
    Time => "time",
    Occur => "occur",
    Occurs => "occurs",
    Occurred => "occurred",
    Present => "present",
    Null => "null",
    True => "true",
    False => "false",
    Boolean => "boolean",
    Number => "number",
    Duration => "duration",
    String => "string",
    List => "list",
    Object => "object",

    // Word forms of the comparison symbols
    Eq => "eq",
    Lt => "lt",
    Gt => "gt",
    Le => "le",
    Ge => "ge",
    Ne => "ne",

    // Transforms
    Count => "count",
    Exist => "exist",
    Exists => "exists",
    Avg => "avg",
    Average => "average",
    Sum => "sum",
    Median => "median",
    First => "first",
    Earliest => "earliest",
    Last => "last",
    Latest => "latest",
    Min => "min",
    Minimum => "minimum",
    Max => "max",
    Maximum => "maximum",

    // Duration units
    Year => "year",
    Years => "years",
    Month => "month",
    Months => "months",
    Week => "week",
    Weeks => "weeks",
    Day => "day",
    Days => "days",
    Hour => "hour",
    Hours => "hours",
    Minute => "minute",
    Minutes => "minutes",
    Second => "second",
    Seconds => "seconds",
}

/// Historical spellings that map onto another keyword
pub const KEYWORD_ALIASES: &[(&str, Keyword)] = &[
    ("lastest", Keyword::Latest),
    ("lte", Keyword::Le),
    ("gte", Keyword::Ge),
];

impl Keyword {
    /// Look up a word, ignoring ASCII case
    pub fn from_word(word: &str) -> Option<Self> {
        if word.bytes().any(|b| b.is_ascii_uppercase()) {
            Self::from_folded(&word.to_ascii_lowercase())
        } else {
            Self::from_folded(word)
        }
    }

    /// COUNT, EXIST(S), AVG/AVERAGE, SUM, MEDIAN
    pub const fn is_read_transform(&self) -> bool {
        matches!(
            self,
            Self::Count | Self::Exist | Self::Exists | Self::Avg | Self::Average | Self::Sum | Self::Median
        )
    }

    /// FIRST/EARLIEST, LAST/LATEST, MIN(IMUM), MAX(IMUM); these take a count
    pub const fn is_positional_transform(&self) -> bool {
        matches!(
            self,
            Self::First
                | Self::Earliest
                | Self::Last
                | Self::Latest
                | Self::Min
                | Self::Minimum
                | Self::Max
                | Self::Maximum
        )
    }

    pub const fn is_transform(&self) -> bool {
        self.is_read_transform() || self.is_positional_transform()
    }

    /// IS, ARE, WAS, WERE
    pub const fn is_copula(&self) -> bool {
        matches!(self, Self::Is | Self::Are | Self::Was | Self::Were)
    }

    pub const fn duration_unit(&self) -> Option<DurationUnit> {
        match self {
            Self::Year | Self::Years => Some(DurationUnit::Year),
            Self::Month | Self::Months => Some(DurationUnit::Month),
            Self::Week | Self::Weeks => Some(DurationUnit::Week),
            Self::Day | Self::Days => Some(DurationUnit::Day),
            Self::Hour | Self::Hours => Some(DurationUnit::Hour),
            Self::Minute | Self::Minutes => Some(DurationUnit::Minute),
            Self::Second | Self::Seconds => Some(DurationUnit::Second),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}
