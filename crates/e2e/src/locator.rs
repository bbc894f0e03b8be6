//! Lazy element references
//!
//! A [`Locator`] only records *how* to find elements. Nothing touches the page
//! until a driver method receives it, and it is re-resolved against the live
//! DOM on every use, so a locator stays valid across re-renders and
//! navigations.

use std::fmt;

use serde::Serialize;

/// How elements are matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocatorQuery {
    /// CSS (or Playwright selector engine) expression
    Css { selector: String },

    /// ARIA role with an optional accessible name
    Role {
        role: String,
        name: Option<String>,
        exact: bool,
    },

    /// Visible text
    Text { text: String, exact: bool },

    /// Associated `<label>` or `aria-label`
    Label { text: String, exact: bool },
}

/// A lazy reference to zero or more elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    #[serde(flatten)]
    query: LocatorQuery,

    /// Restrict to the n-th match (0-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    nth: Option<usize>,
}

impl Locator {
    pub fn new(query: LocatorQuery) -> Self {
        Self { query, nth: None }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(LocatorQuery::Css {
            selector: selector.into(),
        })
    }

    pub fn role(role: impl Into<String>, name: Option<&str>, exact: bool) -> Self {
        Self::new(LocatorQuery::Role {
            role: role.into(),
            name: name.map(String::from),
            exact,
        })
    }

    pub fn text(text: impl Into<String>, exact: bool) -> Self {
        Self::new(LocatorQuery::Text {
            text: text.into(),
            exact,
        })
    }

    pub fn label(text: impl Into<String>, exact: bool) -> Self {
        Self::new(LocatorQuery::Label {
            text: text.into(),
            exact,
        })
    }

    /// Narrow to the first match
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Narrow to the match at `index`
    pub fn nth(&self, index: usize) -> Self {
        Self {
            query: self.query.clone(),
            nth: Some(index),
        }
    }

    pub fn query(&self) -> &LocatorQuery {
        &self.query
    }

    pub fn index(&self) -> Option<usize> {
        self.nth
    }

    /// The CSS selector, when this is a plain selector locator
    pub fn selector(&self) -> Option<&str> {
        match &self.query {
            LocatorQuery::Css { selector } => Some(selector),
            _ => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            LocatorQuery::Css { selector } => write!(f, "locator({:?})", selector)?,
            LocatorQuery::Role { role, name, exact } => {
                write!(f, "get_by_role({:?}", role)?;
                if let Some(name) = name {
                    write!(f, ", name={:?}", name)?;
                }
                if *exact {
                    f.write_str(", exact=true")?;
                }
                f.write_str(")")?;
            }
            LocatorQuery::Text { text, exact } => {
                write!(f, "get_by_text({:?}, exact={})", text, exact)?
            }
            LocatorQuery::Label { text, exact } => {
                write!(f, "get_by_label({:?}, exact={})", text, exact)?
            }
        }
        match self.nth {
            Some(0) => f.write_str(".first"),
            Some(n) => write!(f, ".nth({})", n),
            None => Ok(()),
        }
    }
}

/// Action target: a raw selector or an already-built locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Selector(String),
    Locator(Locator),
}

impl Target {
    /// Resolve to a locator; selectors become CSS locators
    pub fn into_locator(self) -> Locator {
        match self {
            Target::Selector(selector) => Locator::css(selector),
            Target::Locator(locator) => locator,
        }
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Target::Locator(locator)
    }
}

impl From<&Locator> for Target {
    fn from(locator: &Locator) -> Self {
        Target::Locator(locator.clone())
    }
}
