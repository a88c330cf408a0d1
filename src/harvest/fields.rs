use crate::config::Selectors;
use crate::driver::PageDriver;
use crate::error::ExtractionError;
use crate::review::RawReview;

/// Pull name, body, rating and raw date out of one review container.
///
/// Errors are returned as-is; logging and skipping is the harvester's job.
pub async fn extract<D: PageDriver>(
    page: &D,
    container: &D::Element,
    selectors: &Selectors,
) -> Result<RawReview, ExtractionError> {
    let name = first_text(page, container, &selectors.name).await?;
    let content = first_text(page, container, &selectors.body).await?;
    let rate = rating(page, container, &selectors.rating).await?;
    // Name and date share a row; the date is its last child.
    let date = last_text(page, container, &selectors.name_row).await?;

    Ok(RawReview {
        name,
        content,
        rate,
        date,
    })
}

async fn first_text<D: PageDriver>(
    page: &D,
    scope: &D::Element,
    selector: &str,
) -> Result<String, ExtractionError> {
    let found = page.query_within(scope, selector).await?;
    let el = found.first().ok_or_else(|| missing(selector))?;
    Ok(page.inner_text(el).await?)
}

async fn last_text<D: PageDriver>(
    page: &D,
    scope: &D::Element,
    selector: &str,
) -> Result<String, ExtractionError> {
    let found = page.query_within(scope, selector).await?;
    let el = found.last().ok_or_else(|| missing(selector))?;
    Ok(page.inner_text(el).await?)
}

async fn rating<D: PageDriver>(
    page: &D,
    scope: &D::Element,
    selector: &str,
) -> Result<Option<String>, ExtractionError> {
    let found = page.query_within(scope, selector).await?;
    let Some(el) = found.first() else {
        return Ok(None);
    };
    let label = page.accessible_label(el).await?;
    Ok(label.as_deref().and_then(rating_token))
}

/// "5 out of 5 stars" → "5". The label leads with the rating itself.
fn rating_token(label: &str) -> Option<String> {
    label.split_whitespace().next().map(str::to_string)
}

fn missing(selector: &str) -> ExtractionError {
    ExtractionError::Missing {
        selector: selector.to_string(),
    }
}
