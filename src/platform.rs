//! Supported bug bounty platforms and `platform:program` selectors.

use std::fmt;
use std::str::FromStr;

use crate::error::ScopeError;

/// Bug bounty platform a program lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    HackerOne,
}

impl Platform {
    /// Short selector prefix used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HackerOne => "h1",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HackerOne => "HackerOne",
        }
    }
}

impl FromStr for Platform {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h1" => Ok(Self::HackerOne),
            other => Err(ScopeError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A program selected on the command line, e.g. `h1:dyson`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSelector {
    pub platform: Platform,
    pub program: String,
}

impl FromStr for ProgramSelector {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [platform, program] = parts.as_slice() else {
            return Err(ScopeError::BadArgument(format!(
                "expected <platform>:<program>, got '{}'",
                s
            )));
        };

        let program = program.trim();
        if program.is_empty() {
            return Err(ScopeError::BadArgument(format!(
                "missing program name in '{}'",
                s
            )));
        }

        let platform: Platform = platform.trim().parse()?;

        Ok(Self {
            platform,
            program: program.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hackerone_selector() {
        let sel: ProgramSelector = "h1:dyson".parse().unwrap();
        assert_eq!(sel.platform, Platform::HackerOne);
        assert_eq!(sel.program, "dyson");
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = "dyson".parse::<ProgramSelector>().unwrap_err();
        assert!(matches!(err, ScopeError::BadArgument(_)));
    }

    #[test]
    fn test_parse_rejects_extra_separator() {
        let err = "h1:dyson:extra".parse::<ProgramSelector>().unwrap_err();
        assert!(matches!(err, ScopeError::BadArgument(_)));
    }

    #[test]
    fn test_parse_rejects_empty_program() {
        let err = "h1:".parse::<ProgramSelector>().unwrap_err();
        assert!(matches!(err, ScopeError::BadArgument(_)));
    }

    #[test]
    fn test_parse_unknown_platform() {
        let err = "bc:tesla".parse::<ProgramSelector>().unwrap_err();
        assert!(matches!(err, ScopeError::UnsupportedPlatform(p) if p == "bc"));
    }

    #[test]
    fn test_platform_roundtrip_str() {
        assert_eq!(
            Platform::HackerOne.as_str().parse::<Platform>().unwrap(),
            Platform::HackerOne
        );
        assert_eq!(Platform::HackerOne.to_string(), "HackerOne");
    }

    #[test]
    fn test_platform_parse_is_exact() {
        let err = "H1".parse::<Platform>().unwrap_err();
        assert!(matches!(err, ScopeError::UnsupportedPlatform(p) if p == "H1"));
    }
}
