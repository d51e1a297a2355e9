use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Product page. The title is what decides whether the document is a product page at all.
selector!(TITLE_SELECTOR, "div.product_main h1");
selector!(PRICE_SELECTOR, "div.product_main p.price_color");
selector!(AVAILABILITY_SELECTOR, "div.product_main p.instock.availability");
selector!(STAR_RATING_SELECTOR, "div.product_main p.star-rating");
// Home > Books > {Category} > {Title}
selector!(CATEGORY_SELECTOR, "ul.breadcrumb li:nth-child(3) a");
regex!(IN_STOCK_REGEX, r"\((\d+)\s+available\)");

// Listing page.
selector!(PRODUCT_LINK_SELECTOR, "article.product_pod h3 a[href]");
