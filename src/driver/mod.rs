pub mod chrome;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::error::DriverError;

pub use chrome::ChromeSession;

/// The slice of browser automation the scraper needs.
///
/// Element handles are opaque to callers; every query on them goes back
/// through the driver so a test double can stand in for a real browser.
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: Send + Sync;

    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// All elements matching `selector` on the page, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, DriverError>;

    /// All elements matching `selector` inside `scope`, in document order.
    async fn query_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, DriverError>;

    /// Elements with the given ARIA role whose accessible name contains `name`
    /// (case-insensitive).
    async fn find_by_role(&self, role: &str, name: &str)
        -> Result<Vec<Self::Element>, DriverError>;

    async fn inner_text(&self, element: &Self::Element) -> Result<String, DriverError>;

    async fn accessible_label(&self, element: &Self::Element)
        -> Result<Option<String>, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;
}
