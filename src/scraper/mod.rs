use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::models::Product;
use crate::traits::{BrowserSession, SiteSelectors, Timings};

pub const CATEGORY_SEPARATOR: &str = " > ";

/// Why a single product tile could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("missing {0} element")]
    MissingElement(&'static str),
    #[error("{0} is empty")]
    EmptyField(&'static str),
    #[error("invalid product link {href:?}: {reason}")]
    InvalidLink { href: String, reason: String },
}

/// Fields read from one product tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub name: String,
    pub price: String,
    pub url: String,
    pub rating: Option<u32>,
    pub reviews: Option<u64>,
}

impl ListingItem {
    pub fn into_product(self, category_path: &str) -> Product {
        Product {
            category: category_path.to_string(),
            name: self.name,
            price: self.price,
            rating: self.rating.unwrap_or(0),
            reviews: self.reviews.unwrap_or(0),
            url: self.url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    Missing,
    Disabled,
    Enabled,
}

/// Snapshot of one listing page
#[derive(Debug)]
pub struct ListingPage {
    pub items: Vec<Result<ListingItem, ItemError>>,
    pub next: NextControl,
    /// Digest of the item markup, used to notice a "next" click that changed nothing
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcategory {
    pub name: String,
    pub url: String,
}

pub fn category_path(category: &str, subcategory: Option<&str>) -> String {
    match subcategory {
        Some(sub) => format!("{category}{CATEGORY_SEPARATOR}{sub}"),
        None => category.to_string(),
    }
}

/// Digits of `text` read as a number; `None` when there are none
pub fn parse_digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    match digits.parse() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("Ignoring review count {:?}: {}", text, e);
            None
        }
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn resolve_href(href: &str, base: Option<&Url>) -> Result<String, ItemError> {
    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    match resolved {
        Ok(url) => Ok(url.to_string()),
        // Relative link with no page URL to resolve it against
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(href.to_string()),
        Err(e) => Err(ItemError::InvalidLink {
            href: href.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn compile(selector: &str, what: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("Failed to parse {what} selector {selector:?}: {e:?}"))
}

/// Compiled selectors for one site, reused across every page
pub struct ListingParser {
    item_css: String,
    next_css: String,
    item: Selector,
    title: Selector,
    price: Selector,
    ratings: Selector,
    star: Selector,
    review_count: Selector,
    next: Selector,
    subcategory: Selector,
}

impl ListingParser {
    pub fn new(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            item_css: selectors.product_container.clone(),
            next_css: selectors.pagination_next.clone(),
            item: compile(&selectors.product_container, "product")?,
            title: compile(&selectors.title, "title")?,
            price: compile(&selectors.price, "price")?,
            ratings: compile(&selectors.ratings, "ratings")?,
            star: compile(&selectors.rating_star, "rating star")?,
            review_count: compile(&selectors.review_count, "review count")?,
            next: compile(&selectors.pagination_next, "pagination")?,
            subcategory: compile(&selectors.subcategory_link, "subcategory")?,
        })
    }

    pub fn item_selector(&self) -> &str {
        &self.item_css
    }

    pub fn next_selector(&self) -> &str {
        &self.next_css
    }

    pub fn parse_listing(&self, html: &str, page_url: Option<&Url>) -> ListingPage {
        let document = Html::parse_document(html);

        let mut markup = String::new();
        let items = document
            .select(&self.item)
            .map(|item| {
                markup.push_str(&item.html());
                self.parse_item(item, page_url)
            })
            .collect();

        ListingPage {
            items,
            next: self.next_control(&document),
            fingerprint: format!("{:x}", md5::compute(markup)),
        }
    }

    fn parse_item(&self, item: ElementRef<'_>, page_url: Option<&Url>) -> Result<ListingItem, ItemError> {
        let title = item
            .select(&self.title)
            .next()
            .ok_or(ItemError::MissingElement("title"))?;
        let name = element_text(title);
        if name.is_empty() {
            return Err(ItemError::EmptyField("name"));
        }

        let price = item
            .select(&self.price)
            .next()
            .map(element_text)
            .ok_or(ItemError::MissingElement("price"))?;
        if price.is_empty() {
            return Err(ItemError::EmptyField("price"));
        }

        let href = title
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(ItemError::EmptyField("url"))?;
        let url = resolve_href(href, page_url)?;

        let ratings = item.select(&self.ratings).next();
        let rating = ratings.map(|block| block.select(&self.star).count() as u32);
        let reviews = ratings
            .and_then(|block| block.select(&self.review_count).next())
            .and_then(|text| parse_digits(&element_text(text)));

        Ok(ListingItem {
            name,
            price,
            url,
            rating,
            reviews,
        })
    }

    fn next_control(&self, document: &Html) -> NextControl {
        let Some(next) = document.select(&self.next).next() else {
            return NextControl::Missing;
        };
        let element = next.value();
        let disabled = element.attr("disabled").is_some()
            || element.classes().any(|class| class == "disabled")
            || element.attr("aria-disabled") == Some("true");
        if disabled {
            NextControl::Disabled
        } else {
            NextControl::Enabled
        }
    }

    /// Subcategory links in document order; links without text or `href` are ignored
    pub fn parse_subcategories(&self, html: &str, page_url: Option<&Url>) -> Vec<Subcategory> {
        let document = Html::parse_document(html);
        document
            .select(&self.subcategory)
            .filter_map(|link| {
                let name = element_text(link);
                let href = link.value().attr("href")?.trim();
                if name.is_empty() || href.is_empty() {
                    return None;
                }
                let url = resolve_href(href, page_url).ok()?;
                Some(Subcategory { name, url })
            })
            .collect()
    }
}

pub(crate) async fn page_url<S: BrowserSession + ?Sized>(session: &S) -> Option<Url> {
    match session.current_url().await {
        Ok(Some(url)) => Url::parse(&url).ok(),
        Ok(None) => None,
        Err(e) => {
            warn!("Could not read current page URL: {}", e);
            None
        }
    }
}

/// Extract up to `max_products` products from the listing the session is on,
/// following the "next" control page by page.
///
/// Never fails: timeouts and lookup errors end extraction early and whatever
/// was collected so far is returned.
pub async fn extract_products<S: BrowserSession + ?Sized>(
    session: &S,
    parser: &ListingParser,
    timings: &Timings,
    category_path: &str,
    max_products: usize,
) -> Vec<Product> {
    let mut products = Vec::new();
    let mut page_num = 1;
    let mut previous_fingerprint: Option<String> = None;

    while products.len() < max_products {
        if page_num > timings.max_pages {
            info!("Reached maximum page limit ({}) for {}", timings.max_pages, category_path);
            break;
        }

        info!("Extracting products from page {}", page_num);

        match session
            .wait_for_selector(parser.item_selector(), timings.element_timeout)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                warn!("No products found or timeout");
                break;
            }
            Err(e) => {
                warn!("Error waiting for products: {}", e);
                break;
            }
        }

        let html = match session.content().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Error reading page content: {}", e);
                break;
            }
        };
        let base = page_url(session).await;
        let listing = parser.parse_listing(&html, base.as_ref());

        if listing.items.is_empty() {
            info!("No products found on this page");
            break;
        }
        if previous_fingerprint.as_deref() == Some(listing.fingerprint.as_str()) {
            warn!("Page {} shows the same products as the previous page, stopping", page_num);
            break;
        }

        info!("Found {} products on page {}", listing.items.len(), page_num);

        for item in listing.items {
            if products.len() >= max_products {
                break;
            }
            match item {
                Ok(item) => {
                    let product = item.into_product(category_path);
                    info!(
                        "Extracted: {}, Price: {}, Rating: {}, Reviews: {}",
                        product.name, product.price, product.rating, product.reviews
                    );
                    products.push(product);
                }
                Err(e) => warn!("Error extracting product: {}", e),
            }
        }

        if products.len() >= max_products {
            break;
        }

        match listing.next {
            NextControl::Missing => {
                info!("No pagination control found");
                break;
            }
            NextControl::Disabled => {
                info!("No more pages");
                break;
            }
            NextControl::Enabled => {}
        }

        info!("Clicking next page");
        if let Err(e) = session.click(parser.next_selector()).await {
            warn!("Error navigating to next page: {}", e);
            break;
        }
        previous_fingerprint = Some(listing.fingerprint);
        page_num += 1;
        tokio::time::sleep(timings.settle).await;
    }

    info!("Extracted {} products from {}", products.len(), category_path);
    products
}
