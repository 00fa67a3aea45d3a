//! Enumerations and field types for todo items.
//!
//! This module defines the small fixed sets used to classify tasks: the priority
//! ordinal and the color category shown as dots on the calendar.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task importance. Lower ordinal sorts first, `High` is 1.
///
/// Stored on disk as the bare number so snapshots stay compatible with
/// the `1 | 2 | 3` encoding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    #[default]
    #[value(alias = "1")]
    High = 1,
    #[value(alias = "2")]
    Medium = 2,
    #[value(alias = "3")]
    Low = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// The numeric ordinal (1 = highest).
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.ordinal()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(format!("priority must be 1, 2 or 3, got {other}")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Color category of a task. The serialized names double as CSS-style color names.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Assignments.
    #[default]
    Red,
    /// Work.
    #[value(name = "lightgreen", alias = "green")]
    LightGreen,
    /// Going out.
    #[value(name = "skyblue", alias = "blue")]
    SkyBlue,
    /// Everything else.
    Orange,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Red,
        Category::LightGreen,
        Category::SkyBlue,
        Category::Orange,
    ];

    /// Color name as written to the snapshot.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Red => "red",
            Category::LightGreen => "lightgreen",
            Category::SkyBlue => "skyblue",
            Category::Orange => "orange",
        }
    }

    /// Human label, color plus what it is used for.
    pub fn label(self) -> &'static str {
        match self {
            Category::Red => "Red (assignment)",
            Category::LightGreen => "Light green (work)",
            Category::SkyBlue => "Sky blue (outing)",
            Category::Orange => "Orange (other)",
        }
    }

    /// RGB triple used by both the CLI and the TUI to paint dots.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Category::Red => (255, 0, 0),
            Category::LightGreen => (144, 238, 144),
            Category::SkyBlue => (135, 206, 235),
            Category::Orange => (255, 165, 0),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "2");
        let p: Priority = serde_json::from_str("3").unwrap();
        assert_eq!(p, Priority::Low);
        assert!(serde_json::from_str::<Priority>("0").is_err());
        assert!(serde_json::from_str::<Priority>("4").is_err());
    }

    #[test]
    fn test_priority_orders_high_first() {
        let mut ps = vec![Priority::Low, Priority::High, Priority::Medium];
        ps.sort();
        assert_eq!(ps, Priority::ALL.to_vec());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(serde_json::to_string(&Category::LightGreen).unwrap(), "\"lightgreen\"");
        let c: Category = serde_json::from_str("\"skyblue\"").unwrap();
        assert_eq!(c, Category::SkyBlue);
        for c in Category::ALL {
            assert_eq!(serde_json::to_string(&c).unwrap(), format!("\"{}\"", c.as_str()));
        }
    }

    #[test]
    fn test_cli_value_names() {
        assert_eq!(Priority::from_str("1", true).unwrap(), Priority::High);
        assert_eq!(Priority::from_str("low", true).unwrap(), Priority::Low);
        assert_eq!(Category::from_str("lightgreen", true).unwrap(), Category::LightGreen);
        assert_eq!(Category::from_str("blue", true).unwrap(), Category::SkyBlue);
    }
}
