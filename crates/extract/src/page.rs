//! Extraction of raw records from saved pages of the demo book catalog site.
//!
//! Only the fields the catalog cares about are read. Anything missing is left
//! empty on the [`RawRecord`] so that validation, not extraction, decides
//! whether the record is usable.

use exn::OptionExt;
use scraper::{ElementRef, Html};
use serde_json::Value;
use tracing::instrument;

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{Rating, RawRecord};

/// A link to a product page, as found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLink {
    pub title: String,
    pub href: String,
}

#[derive(Debug)]
pub struct ProductPage {
    document: Html,
}
impl ProductPage {
    pub fn from_html(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Returns `true` if the document looks like a product page.
    pub fn is_valid(&self) -> bool {
        self.title().is_some()
    }

    /// Extracts a raw record from the product page.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidDocument`] if the page has no product title.
    #[instrument(skip(self), fields(title))]
    pub fn record(&self) -> Result<RawRecord> {
        let title = self.title().ok_or_raise(|| ErrorKind::InvalidDocument)?;
        tracing::Span::current().record("title", title.as_str());
        Ok(RawRecord {
            title: Some(Value::String(title)),
            price: self.price().map(Value::String),
            quantity: self.quantity().map(Value::from),
            rating: self.rating().map(|r| Value::from(r.stars())),
            category: self.category().map(Value::String),
        })
    }

    fn text_of(&self, selector: &scraper::Selector) -> Option<String> {
        self.document.select(selector).next().map(element_text).filter(|s| !s.is_empty())
    }

    fn title(&self) -> Option<String> {
        self.text_of(&consts::TITLE_SELECTOR)
    }

    fn price(&self) -> Option<String> {
        self.text_of(&consts::PRICE_SELECTOR)
    }

    fn quantity(&self) -> Option<u64> {
        let text = self.text_of(&consts::AVAILABILITY_SELECTOR)?;
        consts::IN_STOCK_REGEX.captures(&text)?.get(1)?.as_str().parse::<u64>().ok()
    }

    fn rating(&self) -> Option<Rating> {
        let element = self.document.select(&consts::STAR_RATING_SELECTOR).next()?;
        element.value().classes().find_map(Rating::from_word)
    }

    fn category(&self) -> Option<String> {
        self.text_of(&consts::CATEGORY_SELECTOR)
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Easy, top-level entrypoint for the extraction of a [`RawRecord`] from a product page.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn extract(html: &str) -> Result<RawRecord> {
    ProductPage::from_html(html).record()
}

/// Collects the product links of a listing page, in document order.
///
/// Links are returned as written in the page (usually relative); resolving
/// them against the page URL is the caller's business.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn product_links(html: &str) -> Vec<ProductLink> {
    let document = Html::parse_document(html);
    let mut links: Vec<ProductLink> = Vec::new();
    for anchor in document.select(&consts::PRODUCT_LINK_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        // Listing text is truncated ("A Light in the ..."), the title attribute isn't.
        let title = anchor.value().attr("title").map(str::to_string).unwrap_or_else(|| element_text(anchor));
        if !links.iter().any(|l| l.href == href) {
            links.push(ProductLink { title, href: href.to_string() });
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_CATEGORY, validate};
    use serde_json::json;

    const PRODUCT_PAGE: &str = r#"
        <html><body>
        <ul class="breadcrumb">
            <li><a href="../../index.html">Home</a></li>
            <li><a href="../category/books_1/index.html">Books</a></li>
            <li><a href="../category/books/poetry_23/index.html">Poetry</a></li>
            <li class="active">A Light in the Attic</li>
        </ul>
        <article class="product_page">
            <div class="row">
                <div class="col-sm-6 product_main">
                    <h1>A Light in the Attic</h1>
                    <p class="price_color">£51.77</p>
                    <p class="instock availability">
                        <i class="icon-ok"></i>
                        In stock (22 available)
                    </p>
                    <p class="star-rating Three">
                        <i class="icon-star"></i>
                    </p>
                </div>
            </div>
        </article>
        </body></html>
    "#;

    const LISTING_PAGE: &str = r#"
        <ol class="row">
            <li><article class="product_pod">
                <h3><a href="catalogue/a-light-in-the-attic_1000/index.html" title="A Light in the Attic">A Light in the ...</a></h3>
            </article></li>
            <li><article class="product_pod">
                <h3><a href="catalogue/tipping-the-velvet_999/index.html" title="Tipping the Velvet">Tipping the Velvet</a></h3>
            </article></li>
            <li><article class="product_pod">
                <h3><a href="catalogue/tipping-the-velvet_999/index.html" title="Tipping the Velvet">Tipping the Velvet</a></h3>
            </article></li>
        </ol>
    "#;

    #[test]
    fn test_extract_product_page() {
        let record = extract(PRODUCT_PAGE).unwrap();
        assert_eq!(record.title, Some(json!("A Light in the Attic")));
        assert_eq!(record.price, Some(json!("£51.77")));
        assert_eq!(record.quantity, Some(json!(22)));
        assert_eq!(record.rating, Some(json!(3)));
        assert_eq!(record.category, Some(json!("Poetry")));
    }

    #[test]
    fn test_extracted_record_validates() {
        let book = validate(&extract(PRODUCT_PAGE).unwrap(), DEFAULT_CATEGORY).unwrap();
        assert_eq!(book.price, 51.77);
        assert_eq!(book.quantity, 22);
        assert_eq!(book.rating.stars(), 3);
        assert_eq!(book.category, "Poetry");
    }

    #[test]
    fn test_missing_fields_are_left_empty() {
        let html = r#"<div class="product_main"><h1>Bare</h1><p class="star-rating Seven"></p></div>"#;
        let record = extract(html).unwrap();
        assert_eq!(record.title, Some(json!("Bare")));
        assert_eq!(record.price, None);
        assert_eq!(record.quantity, None);
        assert_eq!(record.rating, None);
        assert_eq!(record.category, None);
    }

    #[test]
    fn test_invalid_document() {
        let page = ProductPage::from_html("<html><body><h1>Not a product</h1></body></html>");
        assert!(!page.is_valid());
        let err = page.record().unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidDocument);
    }

    #[test]
    fn test_product_links() {
        let links = product_links(LISTING_PAGE);
        assert_eq!(
            links,
            vec![
                ProductLink {
                    title: "A Light in the Attic".to_string(),
                    href: "catalogue/a-light-in-the-attic_1000/index.html".to_string(),
                },
                ProductLink {
                    title: "Tipping the Velvet".to_string(),
                    href: "catalogue/tipping-the-velvet_999/index.html".to_string(),
                },
            ]
        );
    }
}
