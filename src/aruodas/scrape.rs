use core::time::Duration;
use std::sync::Arc;

use compact_str::CompactString;
use reqwest::Client;
use scraper::{Html, Selector};

use awatch::{audio::SoundBank, delta::DeltaTracker, notify, scrape::fetch_text};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("ad listing not found in page")]
    ListingNotFound,
}

pub struct Extractor {
    sel_listing: Selector,
    sel_tbody: Selector,
    sel_row: Selector,
    sel_link: Selector,
}

impl Extractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sel_listing: Selector::parse(".list-search").unwrap(),
            sel_tbody: Selector::parse("tbody").unwrap(),
            sel_row: Selector::parse(".list-row").unwrap(),
            sel_link: Selector::parse("td > div > a").unwrap(),
        }
    }

    /// Ad links exactly as the page presents them, top of the listing first.
    ///
    /// Rows carrying an inline `style` are promoted banners, not ads. Rows
    /// missing the `td > div > a` chain are dropped; only a missing listing
    /// container is an error.
    pub fn extract(&self, page: &str) -> Result<Vec<CompactString>, ExtractError> {
        let html = Html::parse_document(page);
        let listing = html
            .select(&self.sel_listing)
            .next()
            .ok_or(ExtractError::ListingNotFound)?;
        let body = listing
            .select(&self.sel_tbody)
            .next()
            .ok_or(ExtractError::ListingNotFound)?;

        Ok(body
            .select(&self.sel_row)
            .filter(|row| row.attr("style").is_none())
            .filter_map(|row| {
                let link = row.select(&self.sel_link).next()?;
                link.attr("href").map(CompactString::from)
            })
            .collect())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// The watch loop: fetch, extract, diff against the previous poll, alert,
/// replace the cache, sleep. Runs as its own task until the process dies.
pub struct Poller {
    pub client: Client,
    pub extractor: Extractor,
    pub tracker: DeltaTracker,
    pub sounds: Arc<SoundBank>,
    pub url: String,
    pub interval: Duration,
    pub volume: f32,
}

impl Poller {
    pub async fn into_future(mut self) {
        loop {
            if let Err(e) = self.tick().await {
                tracing::warn!(target: "poller", "\x1b[31mpoll failed\x1b[0m: {e:#}");
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One iteration. A fetch or extraction error aborts before any state
    /// changes; a notification error is reported but the cache still rolls.
    async fn tick(&mut self) -> anyhow::Result<()> {
        let page = fetch_text(&self.client, &self.url).await?;
        let links = self.extractor.extract(&page)?;
        tracing::debug!(target: "poller", "{} ads listed", links.len());

        let fresh = self.tracker.diff(&links);
        if !fresh.is_empty() {
            tracing::info!(target: "poller", "\x1b[36m{} new ads\x1b[0m", fresh.len());
            if let Err(e) = notify::announce(&fresh, Arc::clone(&self.sounds), self.volume).await {
                tracing::error!(target: "poller", "\x1b[31mnotification failed\x1b[0m: {e}");
            }
        }

        self.tracker.replace(links);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><div class="list-search"><table><tbody>{rows}</tbody></table></div></body></html>"#
        )
    }

    fn ad_row(href: &str) -> String {
        format!(r#"<tr class="list-row"><td><div><a href="{href}">ad</a></div></td></tr>"#)
    }

    const BROKEN_ROW: &str = r#"<tr class="list-row"><td><div><span>no link here</span></div></td></tr>"#;

    #[test]
    fn well_formed_rows_in_page_order() {
        let extractor = Extractor::new();
        let rows = [ad_row("/skelbimas/1"), ad_row("/skelbimas/2"), ad_row("/skelbimas/3")].concat();

        let links = extractor.extract(&page(&rows)).unwrap();
        assert_eq!(links, ["/skelbimas/1", "/skelbimas/2", "/skelbimas/3"]);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let extractor = Extractor::new();
        let rows = [
            BROKEN_ROW.to_owned(),
            ad_row("/skelbimas/1"),
            BROKEN_ROW.to_owned(),
            ad_row("/skelbimas/2"),
            BROKEN_ROW.to_owned(),
        ]
        .concat();

        let links = extractor.extract(&page(&rows)).unwrap();
        assert_eq!(links, ["/skelbimas/1", "/skelbimas/2"]);
    }

    #[test]
    fn styled_rows_are_banners() {
        let extractor = Extractor::new();
        let banner = r#"<tr class="list-row" style="background:#ffe"><td><div><a href="/reklama">buy now</a></div></td></tr>"#;
        let rows = format!("{}{banner}{}", ad_row("/skelbimas/1"), ad_row("/skelbimas/2"));

        let links = extractor.extract(&page(&rows)).unwrap();
        assert_eq!(links, ["/skelbimas/1", "/skelbimas/2"]);
    }

    #[test]
    fn missing_listing_container_is_an_error() {
        let extractor = Extractor::new();
        assert!(matches!(
            extractor.extract("<html><body><p>503</p></body></html>"),
            Err(ExtractError::ListingNotFound)
        ));
        // A listing shell without a table body is the same structural failure.
        assert!(matches!(
            extractor.extract(r#"<html><body><div class="list-search"></div></body></html>"#),
            Err(ExtractError::ListingNotFound)
        ));
    }
}
