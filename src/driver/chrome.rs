use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::PageDriver;
use crate::config::BrowserSettings;
use crate::error::DriverError;

/// One Chromium instance with a single page, driven over CDP.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: ChromePage,
}

/// The session's page; this is what the scraper drives.
pub struct ChromePage {
    page: Page,
    settle: Duration,
}

impl ChromeSession {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder().arg(format!("--lang={}", settings.locale));
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        // The CDP event loop must be polled for any command to complete.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        info!(locale = %settings.locale, headless = settings.headless, "Browser launched");

        Ok(ChromeSession {
            browser,
            handler,
            page: ChromePage {
                page,
                settle: settings.settle(),
            },
        })
    }

    pub fn page(&self) -> &ChromePage {
        &self.page
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Browser did not exit cleanly: {}", e);
        }
        self.handler.abort();
    }
}

/// CSS that matches elements carrying `role`, natively or via ARIA.
fn role_selector(role: &str) -> String {
    let native = match role {
        "button" => Some("button, input[type=\"button\"], input[type=\"submit\"]"),
        "link" => Some("a[href]"),
        "heading" => Some("h1, h2, h3, h4, h5, h6"),
        _ => None,
    };
    match native {
        Some(tags) => format!("{}, [role=\"{}\"]", tags, role),
        None => format!("[role=\"{}\"]", role),
    }
}

/// Whether a role match is something a user could actually operate.
/// `size` is `None` when the node has no layout box.
fn is_actionable(
    aria_hidden: Option<&str>,
    hidden: bool,
    disabled: bool,
    size: Option<(f64, f64)>,
) -> bool {
    if hidden || disabled || aria_hidden.map(str::trim) == Some("true") {
        return false;
    }
    matches!(size, Some((w, h)) if w > 0.0 && h > 0.0)
}

#[async_trait]
impl PageDriver for ChromePage {
    type Element = Element;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::Query {
                selector: selector.to_string(),
                message: e.to_string(),
            })
    }

    async fn query_within(
        &self,
        scope: &Element,
        selector: &str,
    ) -> Result<Vec<Element>, DriverError> {
        scope
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::Query {
                selector: selector.to_string(),
                message: e.to_string(),
            })
    }

    async fn find_by_role(&self, role: &str, name: &str) -> Result<Vec<Element>, DriverError> {
        let selector = role_selector(role);
        let candidates = self
            .page
            .find_elements(selector.as_str())
            .await
            .map_err(|e| DriverError::Query {
                selector: selector.clone(),
                message: e.to_string(),
            })?;
        let needle = name.to_lowercase();

        let mut matched = Vec::new();
        for el in candidates {
            let label = match el.attribute("aria-label").await? {
                Some(label) => label,
                None => el.inner_text().await?.unwrap_or_default(),
            };
            if !label.to_lowercase().contains(&needle) {
                continue;
            }
            let aria_hidden = el.attribute("aria-hidden").await?;
            let hidden = el.attribute("hidden").await?.is_some();
            let disabled = el.attribute("disabled").await?.is_some();
            // CDP answers with an error for a node that is not rendered.
            let size = el.bounding_box().await.ok().map(|b| (b.width, b.height));
            if is_actionable(aria_hidden.as_deref(), hidden, disabled, size) {
                matched.push(el);
            } else {
                debug!(role, name, "Skipping hidden or disabled match");
            }
        }
        Ok(matched)
    }

    async fn inner_text(&self, element: &Element) -> Result<String, DriverError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn accessible_label(&self, element: &Element) -> Result<Option<String>, DriverError> {
        Ok(element.attribute("aria-label").await?)
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.scroll_into_view().await?;
        element
            .click()
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}
