//! Element locators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    Id,
    Css,
    ClassName,
    TagName,
    Name,
    XPath,
    LinkText,
}

impl By {
    pub fn as_str(&self) -> &'static str {
        match self {
            By::Id => "id",
            By::Css => "css selector",
            By::ClassName => "class name",
            By::TagName => "tag name",
            By::Name => "name",
            By::XPath => "xpath",
            By::LinkText => "link text",
        }
    }
}

/// A `(strategy, selector)` pair naming one element on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub by: By,
    pub selector: String,
}

impl Locator {
    pub fn new(by: By, selector: impl Into<String>) -> Self {
        Self {
            by,
            selector: selector.into(),
        }
    }

    pub fn id(selector: impl Into<String>) -> Self {
        Self::new(By::Id, selector)
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(By::Css, selector)
    }

    pub fn class_name(selector: impl Into<String>) -> Self {
        Self::new(By::ClassName, selector)
    }

    pub fn tag_name(selector: impl Into<String>) -> Self {
        Self::new(By::TagName, selector)
    }

    pub fn name(selector: impl Into<String>) -> Self {
        Self::new(By::Name, selector)
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(By::XPath, selector)
    }

    pub fn link_text(selector: impl Into<String>) -> Self {
        Self::new(By::LinkText, selector)
    }

    /// CSS equivalent for the strategies WebDriver only exposes through CSS
    pub fn to_css(&self) -> Option<String> {
        match self.by {
            By::Css => Some(self.selector.clone()),
            By::ClassName => Some(format!(".{}", self.selector)),
            By::TagName => Some(self.selector.clone()),
            By::Name => Some(format!("[name='{}']", self.selector)),
            By::Id | By::XPath | By::LinkText => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.by.as_str(), self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_translation() {
        assert_eq!(Locator::class_name("inventory_item").to_css().as_deref(), Some(".inventory_item"));
        assert_eq!(Locator::name("btnSubmit").to_css().as_deref(), Some("[name='btnSubmit']"));
        assert_eq!(Locator::tag_name("h3").to_css().as_deref(), Some("h3"));
        assert_eq!(Locator::id("user-name").to_css(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Locator::id("password").to_string(), "(id, password)");
        assert_eq!(
            Locator::css("h3[data-test='error']").to_string(),
            "(css selector, h3[data-test='error'])"
        );
    }
}
