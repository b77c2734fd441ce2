//! Set-based label/annotation selector expressions.
//!
//! Supports the usual requirement forms, comma-separated and ANDed:
//! `k=v`, `k==v`, `k!=v`, `k`, `!k`, `k in (a,b)`, `k notin (a,b)`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

static SET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9._/-]+)\s+(in|notin)\s+\(\s*([^)]*)\)$").unwrap()
});
static OP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9._/-]+)\s*(==|!=|=)\s*([A-Za-z0-9._/-]*)$").unwrap()
});
static EXISTS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(!?)\s*([A-Za-z0-9._/-]+)$").unwrap());

/// Error for a requirement that does not parse.
#[derive(Debug, Clone, Error)]
#[error("invalid selector requirement {0:?}")]
pub struct RequirementError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Eq,
    NotEq,
    Exists,
    NotExists,
    In,
    NotIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Requirement {
    key: String,
    op: Op,
    values: Vec<String>,
}

impl Requirement {
    fn matches(&self, map: &BTreeMap<String, String>) -> bool {
        let actual = map.get(&self.key);
        match self.op {
            Op::Eq => actual == Some(&self.values[0]),
            // Absent keys satisfy negative requirements, as in Kubernetes.
            Op::NotEq => actual != Some(&self.values[0]),
            Op::Exists => actual.is_some(),
            Op::NotExists => actual.is_none(),
            Op::In => actual.is_some_and(|v| self.values.contains(v)),
            Op::NotIn => actual.is_none_or(|v| !self.values.contains(v)),
        }
    }
}

/// A parsed selector expression. The empty expression matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// Parses a selector expression. Parsing happens once per selector; the
    /// compiled form is reused across all documents.
    pub fn parse(expression: &str) -> Result<LabelSelector, RequirementError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Ok(LabelSelector::default());
        }
        let mut requirements = Vec::new();
        for part in split_requirements(expression) {
            requirements.push(parse_requirement(part.trim())?);
        }
        Ok(LabelSelector { requirements })
    }

    /// True when every requirement holds against the given key/value map.
    pub fn matches(&self, map: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(map))
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// Splits on commas outside parentheses so `in (a,b)` value lists stay whole.
fn split_requirements(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_requirement(part: &str) -> Result<Requirement, RequirementError> {
    if let Some(caps) = SET_RE.captures(part) {
        let values: Vec<String> = caps[3]
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(RequirementError(part.to_string()));
        }
        let op = if &caps[2] == "in" { Op::In } else { Op::NotIn };
        return Ok(Requirement {
            key: caps[1].to_string(),
            op,
            values,
        });
    }
    if let Some(caps) = OP_RE.captures(part) {
        let op = if &caps[2] == "!=" { Op::NotEq } else { Op::Eq };
        return Ok(Requirement {
            key: caps[1].to_string(),
            op,
            values: vec![caps[3].to_string()],
        });
    }
    if let Some(caps) = EXISTS_RE.captures(part) {
        let op = if &caps[1] == "!" {
            Op::NotExists
        } else {
            Op::Exists
        };
        return Ok(Requirement {
            key: caps[2].to_string(),
            op,
            values: Vec::new(),
        });
    }
    Err(RequirementError(part.to_string()))
}
