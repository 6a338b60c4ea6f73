use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Infrastructure class of an edge. Unclassified edges carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InfrClass {
    #[serde(rename = "Cycle Tracks")]
    CycleTracks,
    #[serde(rename = "Cycle Lanes")]
    CycleLanes,
    #[serde(rename = "Calm Traffic Ways")]
    CalmTrafficWays,
    #[serde(rename = "Turnuse")]
    Turnuse,
}

impl InfrClass {
    /// Classes that can be derived from GIP facility codes
    pub const CLASSIFIABLE: [InfrClass; 3] = [
        InfrClass::CycleTracks,
        InfrClass::CycleLanes,
        InfrClass::CalmTrafficWays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfrClass::CycleTracks => "Cycle Tracks",
            InfrClass::CycleLanes => "Cycle Lanes",
            InfrClass::CalmTrafficWays => "Calm Traffic Ways",
            InfrClass::Turnuse => "Turnuse",
        }
    }
}

impl fmt::Display for InfrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfrClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cycle Tracks" => Ok(InfrClass::CycleTracks),
            "Cycle Lanes" => Ok(InfrClass::CycleLanes),
            "Calm Traffic Ways" => Ok(InfrClass::CalmTrafficWays),
            "Turnuse" => Ok(InfrClass::Turnuse),
            other => Err(format!("Unknown infrastructure class '{other}'")),
        }
    }
}

/// Selects the rows an aggregation runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassFilter {
    /// All rows, classified or not
    Total,
    Class(InfrClass),
}

impl ClassFilter {
    pub fn matches(&self, class: Option<InfrClass>) -> bool {
        match self {
            ClassFilter::Total => true,
            ClassFilter::Class(wanted) => class == Some(*wanted),
        }
    }
}

impl fmt::Display for ClassFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassFilter::Total => f.write_str("Total"),
            ClassFilter::Class(class) => f.write_str(class.as_str()),
        }
    }
}

impl From<InfrClass> for ClassFilter {
    fn from(class: InfrClass) -> Self {
        ClassFilter::Class(class)
    }
}

impl FromStr for ClassFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Total" {
            Ok(ClassFilter::Total)
        } else {
            s.parse().map(ClassFilter::Class)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_display() {
        for class in InfrClass::CLASSIFIABLE {
            assert_eq!(class.to_string().parse::<InfrClass>(), Ok(class));
        }
    }

    #[test]
    fn total_filter_matches_unclassified() {
        assert!(ClassFilter::Total.matches(None));
        assert!(!ClassFilter::Class(InfrClass::CycleLanes).matches(None));
        assert!("Total".parse::<ClassFilter>().unwrap().matches(Some(InfrClass::Turnuse)));
    }
}
