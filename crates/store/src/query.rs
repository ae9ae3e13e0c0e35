use common::Page;

/// Filter for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Substring matched against the product category. `None` or an empty
    /// string lists every product.
    pub category: Option<String>,

    /// Window applied after filtering.
    pub page: Page,
}

impl ProductQuery {
    /// Creates an unfiltered query over the default page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by category substring.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the page window.
    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub(crate) fn matches_category(&self, category: &str) -> bool {
        match self.category.as_deref() {
            None | Some("") => true,
            Some(wanted) => category.contains(wanted),
        }
    }
}

/// Filter for the orders owned by one user.
#[derive(Debug, Clone)]
pub struct OrderQuery {
    pub user_id: String,
    pub page: Page,
}

impl OrderQuery {
    /// Creates a query for a user's orders over the default page.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            page: Page::default(),
        }
    }

    /// Sets the page window.
    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_category_matches_everything() {
        assert!(ProductQuery::new().matches_category("books"));
        assert!(ProductQuery::new().category("").matches_category("books"));
    }

    #[test]
    fn category_is_substring_match() {
        let query = ProductQuery::new().category("book");
        assert!(query.matches_category("books"));
        assert!(query.matches_category("ebooks"));
        assert!(!query.matches_category("toys"));
    }
}
