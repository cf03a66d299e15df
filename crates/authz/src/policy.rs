//! Declarative route policy.
//!
//! Every protected endpoint is listed once in a [`PolicyTable`]; the HTTP
//! guard asks the table for the [`Requirement`] of the incoming request and
//! evaluates it against the caller's roles.

use std::fmt;

use crate::Role;

/// What a caller must present to reach an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Open to everyone, with or without a token.
    Anonymous,
    /// Any valid token.
    Authenticated,
    /// A valid token carrying at least one of the listed roles.
    AnyRole(&'static [Role]),
}

/// Outcome of evaluating a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No valid token was presented.
    Unauthenticated,
    /// The token is valid but lacks a required role.
    Forbidden,
}

impl Requirement {
    /// Evaluate against the caller's roles; `None` means no valid token.
    pub fn evaluate(&self, roles: Option<&[Role]>) -> Decision {
        match (self, roles) {
            (Requirement::Anonymous, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (Requirement::Authenticated, Some(_)) => Decision::Allow,
            (Requirement::AnyRole(required), Some(held)) => {
                if held.iter().any(|role| required.contains(role)) {
                    Decision::Allow
                } else {
                    Decision::Forbidden
                }
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Anonymous => f.write_str("anonymous"),
            Requirement::Authenticated => f.write_str("authenticated"),
            Requirement::AnyRole(roles) => {
                let names: Vec<_> = roles.iter().map(Role::as_str).collect();
                write!(f, "any of [{}]", names.join(", "))
            }
        }
    }
}

/// One row of the policy table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub method: &'static str,
    /// Absolute path; `{name}` segments match any single segment.
    pub pattern: &'static str,
    pub requirement: Requirement,
}

impl Rule {
    fn matches(&self, method: &str, path: &str) -> bool {
        self.method.eq_ignore_ascii_case(method) && pattern_matches(self.pattern, path)
    }
}

/// Ordered route-to-requirement table.
///
/// Requests outside `scope` are always allowed. Requests inside it that no
/// rule matches require authentication.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    scope: &'static str,
    rules: Vec<Rule>,
}

impl PolicyTable {
    pub fn new(scope: &'static str) -> Self {
        Self {
            scope,
            rules: Vec::new(),
        }
    }

    /// Append a rule; the first matching rule wins.
    pub fn rule(mut self, method: &'static str, pattern: &'static str, requirement: Requirement) -> Self {
        self.rules.push(Rule {
            method,
            pattern,
            requirement,
        });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    /// Resolve the requirement for a request.
    pub fn requirement(&self, method: &str, path: &str) -> Requirement {
        if !in_scope(self.scope, path) {
            return Requirement::Anonymous;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.requirement)
            .unwrap_or(Requirement::Authenticated)
    }
}

fn in_scope(scope: &str, path: &str) -> bool {
    match path.strip_prefix(scope) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut expected = segments(pattern);
    let mut actual = segments(path);

    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(want), Some(got)) => {
                let is_param = want.starts_with('{') && want.ends_with('}');
                if !is_param && want != got {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
