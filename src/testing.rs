//! In-memory browser session and listing fixtures for tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::traits::{BrowserSession, Timings};

pub fn quick_timings() -> Timings {
    Timings {
        settle: Duration::ZERO,
        element_timeout: Duration::ZERO,
        max_pages: 50,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Next {
    Missing,
    Disabled,
    Enabled,
}

/// One product tile in a fixture page
pub struct Tile {
    name: String,
    price: String,
    href: String,
    stars: Option<usize>,
    reviews: Option<String>,
}

impl Tile {
    pub fn new(name: &str, price: &str, href: &str) -> Self {
        Self {
            name: name.to_string(),
            price: price.to_string(),
            href: href.to_string(),
            stars: None,
            reviews: None,
        }
    }

    pub fn stars(mut self, stars: usize) -> Self {
        self.stars = Some(stars);
        self
    }

    pub fn reviews(mut self, text: &str) -> Self {
        self.stars.get_or_insert(0);
        self.reviews = Some(text.to_string());
        self
    }

    fn render(&self) -> String {
        let ratings = self.stars.map_or_else(String::new, |stars| {
            let review = self
                .reviews
                .as_ref()
                .map_or_else(String::new, |text| format!(r#"<p class="pull-right">{text}</p>"#));
            let spans = r#"<span class="glyphicon glyphicon-star"></span>"#.repeat(stars);
            format!(r#"<div class="ratings">{review}<p data-rating="{stars}">{spans}</p></div>"#)
        });
        format!(
            r#"<div class="col-md-4"><div class="thumbnail"><div class="caption">
<h4 class="price">{}</h4><h4><a href="{}" class="title">{}</a></h4></div>{}</div></div>"#,
            self.price, self.href, self.name, ratings
        )
    }
}

/// Render a listing page shaped like the AJAX shop's markup
pub fn listing_page(tiles: &[Tile], next: Next) -> String {
    let body: String = tiles.iter().map(Tile::render).collect();
    let pagination = match next {
        Next::Missing => String::new(),
        Next::Disabled => r#"<ul class="pagination"><li class="next disabled"><button class="page-link next disabled">»</button></li></ul>"#.to_string(),
        Next::Enabled => r#"<ul class="pagination"><li><button class="page-link next">»</button></li></ul>"#.to_string(),
    };
    format!("<html><body><div class=\"row\">{body}</div>{pagination}</body></html>")
}

#[derive(Default)]
struct FakeState {
    url: Option<String>,
    page: usize,
    visited: Vec<String>,
    clicks: usize,
    closed: bool,
    content_failures: usize,
}

/// Serves canned pages per URL; a successful "next" click moves to the
/// following page and stays on the last one once the sequence runs out.
#[derive(Default)]
pub struct FakeSession {
    sites: HashMap<String, Vec<String>>,
    state: Mutex<FakeState>,
    broken_clicks: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, url: &str, pages: Vec<String>) -> Self {
        self.sites.insert(url.to_string(), pages);
        self
    }

    /// Fail the next `count` calls to `content`
    pub fn failing_content(self, count: usize) -> Self {
        self.state.lock().unwrap().content_failures = count;
        self
    }

    /// Make every click fail even when the control is on the page
    pub fn broken_clicks(mut self) -> Self {
        self.broken_clicks = true;
        self
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn current_html(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        let pages = self.sites.get(state.url.as_ref()?)?;
        pages.get(state.page).cloned()
    }

    fn matches(&self, selector: &str) -> Result<bool> {
        let selector = Selector::parse(selector).map_err(|e| anyhow!("bad selector: {e:?}"))?;
        Ok(self
            .current_html()
            .is_some_and(|html| Html::parse_document(&html).select(&selector).next().is_some()))
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        if !self.sites.contains_key(url) {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"));
        }
        let mut state = self.state.lock().unwrap();
        state.url = Some(url.to_string());
        state.page = 0;
        state.visited.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        self.matches(selector)
    }

    async fn content(&self) -> Result<String> {
        {
            let mut state = self.state.lock().unwrap();
            if state.content_failures > 0 {
                state.content_failures -= 1;
                return Err(anyhow!("Execution context was destroyed"));
            }
        }
        self.current_html().ok_or_else(|| anyhow!("no page loaded"))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        if !self.matches(selector)? {
            return Err(anyhow!("no element matches {selector}"));
        }
        if self.broken_clicks {
            self.state.lock().unwrap().clicks += 1;
            return Err(anyhow!("Node is detached from document"));
        }
        let mut state = self.state.lock().unwrap();
        let last = state
            .url
            .as_ref()
            .and_then(|url| self.sites.get(url))
            .map_or(0, |pages| pages.len().saturating_sub(1));
        state.clicks += 1;
        state.page = (state.page + 1).min(last);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}
