//! Record sources: where raw records come from before they reach a
//! [`Pipeline`](crate::Pipeline).
//!
//! Supported sources:
//! - a `.json` file holding an array of records,
//! - a `.jsonl`/`.ndjson` file holding one record object per line,
//! - a directory of saved product pages (`*.html`/`*.htm`, not recursive),
//! - a single saved product page.
//!
//! A saved page that is not a product page but a listing (a category or
//! search result page) is followed instead: every product it links to with a
//! relative link is read as a product page, resolved against the listing's
//! directory. Listings are followed one level deep only.
//!
//! A source that can't be opened at all is an error for the caller. Anything
//! that goes wrong after that (an unreadable page, a malformed line) only
//! costs that one item: it is logged and skipped, and never reaches the
//! pipeline.

pub mod error;

use crate::source::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use serde_json::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use tomes_extract::{ProductPage, RawRecord, product_links};
use tracing::instrument;

const PAGE_EXTENSIONS: &[&str] = &["html", "htm"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Json(PathBuf),
    JsonLines(PathBuf),
    Pages(PathBuf),
    Page(PathBuf),
}

impl Source {
    /// Classify a path: directories hold pages, files go by extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await.or_raise(|| ErrorKind::NotFound(path.clone()))?;
        if metadata.is_dir() {
            return Ok(Self::Pages(path));
        }
        Ok(match extension(&path).as_deref() {
            Some("json") => Self::Json(path),
            Some("jsonl" | "ndjson") => Self::JsonLines(path),
            Some(ext) if PAGE_EXTENSIONS.contains(&ext) => Self::Page(path),
            _ => exn::bail!(ErrorKind::Unsupported(path)),
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Json(path) | Self::JsonLines(path) | Self::Pages(path) | Self::Page(path) => path,
        }
    }

    /// Stream every item of this source, in order, failures included.
    pub fn read(&self) -> impl Stream<Item = Result<RawRecord>> + '_ {
        stream!({
            match self {
                Self::Json(path) => match read_json_array(path).await {
                    Ok(items) => {
                        for item in items {
                            yield item;
                        }
                    },
                    Err(err) => yield Err(err),
                },
                Self::JsonLines(path) => match read_text(path).await {
                    Ok(text) => {
                        let lines = text.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());
                        for (index, line) in lines {
                            yield parse_line(path, index + 1, line);
                        }
                    },
                    Err(err) => yield Err(err),
                },
                Self::Pages(dir) => match list_pages(dir).await {
                    Ok(pages) => {
                        for page in pages {
                            for await item in read_page(&page) {
                                yield item;
                            }
                        }
                    },
                    Err(err) => yield Err(err),
                },
                Self::Page(path) => {
                    for await item in read_page(path) {
                        yield item;
                    }
                },
            }
        })
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.path().display())
    }
}

/// Stream the records of every source in turn, skipping (and logging) every
/// item that can't be read.
pub fn records(sources: &[Source]) -> impl Stream<Item = RawRecord> + '_ {
    stream!({
        for source in sources {
            let mut skipped: u64 = 0;
            for await item in source.read() {
                match item {
                    Ok(record) => yield record,
                    Err(err) => {
                        let kind: &ErrorKind = &err;
                        tracing::warn!(%source, error = %kind, "skipping unreadable item");
                        skipped += 1;
                    },
                }
            }
            if skipped > 0 {
                tracing::info!(%source, skipped, "finished reading source");
            }
        }
    })
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.or_raise(|| ErrorKind::Io(path.to_path_buf()))
}

fn record(path: &Path, index: usize, value: Value) -> Result<RawRecord> {
    RawRecord::from_json(value).or_raise(|| ErrorKind::Record {
        path: path.to_path_buf(),
        index,
    })
}

async fn read_json_array(path: &Path) -> Result<Vec<Result<RawRecord>>> {
    let text = read_text(path).await?;
    let values: Vec<Value> = serde_json::from_str(&text).or_raise(|| ErrorKind::Json(path.to_path_buf()))?;
    Ok(values.into_iter().enumerate().map(|(index, value)| record(path, index + 1, value)).collect())
}

fn parse_line(path: &Path, index: usize, line: &str) -> Result<RawRecord> {
    let value: Value = serde_json::from_str(line).or_raise(|| ErrorKind::Record {
        path: path.to_path_buf(),
        index,
    })?;
    record(path, index, value)
}

async fn list_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.or_raise(|| ErrorKind::Io(dir.to_path_buf()))?;
    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await.or_raise(|| ErrorKind::Io(dir.to_path_buf()))? {
        let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
        let path = entry.path();
        if is_file && extension(&path).is_some_and(|ext| PAGE_EXTENSIONS.contains(&ext.as_str())) {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

/// What a saved page turned out to be.
enum Saved {
    Book(RawRecord),
    Listing(Vec<PathBuf>),
}

fn read_page(path: &Path) -> impl Stream<Item = Result<RawRecord>> + '_ {
    stream!({
        let saved = match read_text(path).await {
            Ok(html) => parse_page(path, &html),
            Err(err) => Err(err),
        };
        match saved {
            Ok(Saved::Book(record)) => yield Ok(record),
            Ok(Saved::Listing(products)) => {
                tracing::debug!(page = %path.display(), products = products.len(), "following listing page");
                for product in products {
                    yield read_product(&product).await;
                }
            },
            Err(err) => yield Err(err),
        }
    })
}

async fn read_product(path: &Path) -> Result<RawRecord> {
    let html = read_text(path).await?;
    tomes_extract::extract(&html).or_raise(|| ErrorKind::Page(path.to_path_buf()))
}

fn parse_page(path: &Path, html: &str) -> Result<Saved> {
    let page = ProductPage::from_html(html);
    if page.is_valid() {
        return page.record().map(Saved::Book).or_raise(|| ErrorKind::Page(path.to_path_buf()));
    }
    let base = path.parent().unwrap_or(Path::new(""));
    let products: Vec<PathBuf> =
        product_links(html).iter().filter_map(|link| local_link(base, &link.href)).collect();
    if products.is_empty() {
        exn::bail!(ErrorKind::Page(path.to_path_buf()));
    }
    Ok(Saved::Listing(products))
}

/// Resolve a relative link against `base`. Absolute paths and URLs are not
/// part of the saved copy.
fn local_link(base: &Path, href: &str) -> Option<PathBuf> {
    let href = href.split(['#', '?']).next().unwrap_or_default();
    (!href.is_empty() && !href.starts_with('/') && !href.contains("://")).then(|| base.join(href))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    fn page(title: &str, rating: &str) -> String {
        format!(
            r#"<html><body>
                <ul class="breadcrumb">
                    <li><a href="/">Home</a></li>
                    <li><a href="/books">Books</a></li>
                    <li><a href="/poetry">Poetry</a></li>
                    <li class="active">{title}</li>
                </ul>
                <div class="product_main">
                    <h1>{title}</h1>
                    <p class="price_color">£51.77</p>
                    <p class="instock availability">In stock (22 available)</p>
                    <p class="star-rating {rating}"></p>
                </div>
            </body></html>"#
        )
    }

    async fn titles(sources: &[Source]) -> Vec<Value> {
        records(sources).filter_map(|r| async move { r.title }).collect().await
    }

    #[tokio::test]
    async fn test_open() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.JSONL", "c.ndjson", "d.html", "e.htm", "f.csv"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let open = |name: &str| Source::open(dir.path().join(name));
        assert!(matches!(open("a.json").await.unwrap(), Source::Json(_)));
        assert!(matches!(open("b.JSONL").await.unwrap(), Source::JsonLines(_)));
        assert!(matches!(open("c.ndjson").await.unwrap(), Source::JsonLines(_)));
        assert!(matches!(open("d.html").await.unwrap(), Source::Page(_)));
        assert!(matches!(open("e.htm").await.unwrap(), Source::Page(_)));
        assert_eq!(Source::open(dir.path()).await.unwrap(), Source::Pages(dir.path().to_path_buf()));

        let err = open("f.csv").await.unwrap_err();
        assert!(matches!(*err, ErrorKind::Unsupported(_)));
        let err = open("missing.json").await.unwrap_err();
        assert!(matches!(*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_json_array_skips_malformed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        let contents = json!([
            {"Título": "Olio", "Preço (£)": "23.88", "Quantidade": 19, "Avaliação": 1, "Categoria": "Poetry"},
            42,
            {"title": "Sapiens", "price": 54.23, "quantity": 20, "rating": 5, "category": "History"},
        ]);
        std::fs::write(&path, contents.to_string()).unwrap();
        let source = Source::open(&path).await.unwrap();

        let items = source.read().collect::<Vec<_>>().await;
        assert_eq!(items.len(), 3);
        assert!(matches!(**items[1].as_ref().unwrap_err(), ErrorKind::Record { index: 2, .. }));

        assert_eq!(titles(&[source]).await, vec![json!("Olio"), json!("Sapiens")]);
    }

    #[tokio::test]
    async fn test_json_not_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(&path, r#"{"title": "Olio"}"#).unwrap();
        let source = Source::open(&path).await.unwrap();
        let items = source.read().collect::<Vec<_>>().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(**items[0].as_ref().unwrap_err(), ErrorKind::Json(_)));
        assert!(titles(&[source]).await.is_empty());
    }

    #[tokio::test]
    async fn test_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.jsonl");
        let lines = [
            r#"{"title": "One", "price": 1, "quantity": 1, "rating": 1}"#,
            "",
            "{not json",
            r#"{"title": "Two", "price": 2, "quantity": 2, "rating": 2}"#,
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();
        let source = Source::open(&path).await.unwrap();

        let items = source.read().collect::<Vec<_>>().await;
        assert_eq!(items.len(), 3);
        assert!(matches!(**items[1].as_ref().unwrap_err(), ErrorKind::Record { index: 3, .. }));
        assert_eq!(titles(&[source]).await, vec![json!("One"), json!("Two")]);
    }

    #[tokio::test]
    async fn test_page_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.html"), page("Second", "Three")).unwrap();
        std::fs::write(dir.path().join("a.htm"), page("First", "One")).unwrap();
        std::fs::write(dir.path().join("c.html"), "<html><body><p>Not a book</p></body></html>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), page("Ignored", "Five")).unwrap();
        std::fs::create_dir(dir.path().join("nested.html")).unwrap();
        let source = Source::open(dir.path()).await.unwrap();

        let items = source.read().collect::<Vec<_>>().await;
        assert_eq!(items.len(), 3);
        assert!(matches!(**items[2].as_ref().unwrap_err(), ErrorKind::Page(_)));

        let records = records(std::slice::from_ref(&source)).collect::<Vec<_>>().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, Some(json!("First")));
        assert_eq!(records[0].rating, Some(json!(1)));
        assert_eq!(records[1].title, Some(json!("Second")));
        assert_eq!(records[1].category, Some(json!("Poetry")));
        assert_eq!(records[1].quantity, Some(json!(22)));
    }

    #[tokio::test]
    async fn test_listing_page_follows_product_links() {
        let dir = tempfile::tempdir().unwrap();
        for (slug, title, rating) in [("olio_1", "Olio", "One"), ("sapiens_2", "Sapiens", "Five")] {
            let product_dir = dir.path().join("catalogue").join(slug);
            std::fs::create_dir_all(&product_dir).unwrap();
            std::fs::write(product_dir.join("index.html"), page(title, rating)).unwrap();
        }
        let listing = r#"<html><body><ol class="row">
            <li><article class="product_pod"><h3><a href="catalogue/olio_1/index.html" title="Olio">Olio</a></h3></article></li>
            <li><article class="product_pod"><h3><a href="catalogue/gone_3/index.html" title="Gone">Gone</a></h3></article></li>
            <li><article class="product_pod"><h3><a href="catalogue/sapiens_2/index.html#top" title="Sapiens">Sapiens</a></h3></article></li>
            <li><article class="product_pod"><h3><a href="https://example.com/remote.html" title="Remote">Remote</a></h3></article></li>
            <li><article class="product_pod"><h3><a href="/elsewhere/index.html" title="Elsewhere">Elsewhere</a></h3></article></li>
        </ol></body></html>"#;
        let path = dir.path().join("index.html");
        std::fs::write(&path, listing).unwrap();
        let source = Source::open(&path).await.unwrap();

        let items = source.read().collect::<Vec<_>>().await;
        assert_eq!(items.len(), 3);
        assert!(matches!(**items[1].as_ref().unwrap_err(), ErrorKind::Io(_)));
        assert_eq!(titles(&[source]).await, vec![json!("Olio"), json!("Sapiens")]);
    }

    #[test]
    fn test_local_link() {
        let base = Path::new("saved/category");
        assert_eq!(local_link(base, "../olio_1/index.html"), Some(base.join("../olio_1/index.html")));
        assert_eq!(local_link(base, "olio_1/index.html?page=2"), Some(base.join("olio_1/index.html")));
        assert_eq!(local_link(base, "#top"), None);
        assert_eq!(local_link(base, "/index.html"), None);
        assert_eq!(local_link(base, "http://example.com/index.html"), None);
    }

    #[tokio::test]
    async fn test_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let page_path = dir.path().join("page.html");
        std::fs::write(&page_path, page("From a page", "Four")).unwrap();
        let json_path = dir.path().join("books.json");
        std::fs::write(&json_path, r#"[{"title": "From JSON"}]"#).unwrap();
        let sources = vec![Source::open(&page_path).await.unwrap(), Source::open(&json_path).await.unwrap()];
        assert_eq!(titles(&sources).await, vec![json!("From a page"), json!("From JSON")]);
        assert_eq!(sources[0].to_string(), page_path.display().to_string());
    }
}
