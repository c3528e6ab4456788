use scraper::{Html, Selector};

use crate::config::ConfigError;
use crate::error::Error;
use crate::util::fetch_bytes;

/// Origin prepended to root-relative image paths.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://static.feissarimokat.com";

/// Element that holds the post body on an item page. Images outside it are
/// site chrome and ads.
pub const DEFAULT_CONTENT_SELECTOR: &str = "div.postbody";

/// Scrapes post images from item pages.
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    client: reqwest::Client,
    base_url: String,
    selector: Selector,
    max_bytes: usize,
}

impl ImageExtractor {
    /// Creates an extractor that picks `<img>` elements nested in
    /// `content_selector` and resolves relative sources against `base_url`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Selector`] if `content_selector` is not a valid CSS
    /// selector.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        content_selector: &str,
        max_bytes: usize,
    ) -> Result<Self, ConfigError> {
        let selector = image_selector(content_selector)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            selector,
            max_bytes,
        })
    }

    /// Fetches `page_url` and returns the absolute URLs of the post images in
    /// document order.
    ///
    /// # Errors
    ///
    /// [`Error::Extract`] on network failure, timeout, oversized body or any
    /// status other than 200. The error is [`Recoverable`]: callers fall back
    /// to an empty image list for this item.
    ///
    /// [`Recoverable`]: crate::error::Severity::Recoverable
    pub async fn extract_images(&self, page_url: &str) -> Result<Vec<String>, Error> {
        let bytes = fetch_bytes(&self.client, page_url, self.max_bytes)
            .await
            .map_err(|source| Error::Extract {
                url: page_url.to_string(),
                source,
            })?;

        // Pages with stray non-UTF-8 bytes still yield their images.
        let html = String::from_utf8_lossy(&bytes);
        let images = extract_image_urls(&html, &self.selector, &self.base_url);

        tracing::debug!(url = %page_url, images = images.len(), "Extracted images");
        Ok(images)
    }
}

/// Builds the `<container> img` descendant selector.
pub fn image_selector(content_selector: &str) -> Result<Selector, ConfigError> {
    let css = format!("{} img", content_selector.trim());
    Selector::parse(&css).map_err(|e| ConfigError::Selector {
        selector: content_selector.to_string(),
        message: e.to_string(),
    })
}

/// Returns the normalized `src` of every element `selector` matches in
/// `html`, in document order.
///
/// Elements without a `src`, or with a blank one, are skipped on purpose:
/// normalizing an empty path would yield the bare base origin, which is not
/// an image.
pub fn extract_image_urls(html: &str, selector: &Selector, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(|src| normalize_image_url(base_url, src))
        .collect()
}

/// Makes an image source absolute.
///
/// Sources starting with `http` pass through unchanged. Anything else is taken
/// as a root-relative path on `base_url`, joined with exactly one `/`.
pub fn normalize_image_url(base_url: &str, src: &str) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if src.starts_with('/') {
        format!("{}{}", base, src)
    } else {
        format!("{}/{}", base, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use crate::util::{build_client, default_user_agent, DEFAULT_TIMEOUT};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POST_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Post</title></head>
<body>
  <div class="header"><img src="/gfx/logo.png"></div>
  <div class="content postbody">
    <p>Kuvat:</p>
    <img src="/img/1.jpg" alt="one">
    <div class="inner"><img src="https://cdn.example.com/2.jpg"></div>
    <img alt="no source">
    <img src="  ">
    <img src="img/3.gif">
  </div>
  <div class="ads"><img src="https://ads.example.com/banner.gif"></div>
</body>
</html>"#;

    fn default_selector() -> Selector {
        image_selector(DEFAULT_CONTENT_SELECTOR).unwrap()
    }

    #[test]
    fn test_relative_path_gets_base_origin() {
        assert_eq!(
            normalize_image_url(DEFAULT_IMAGE_BASE_URL, "/img/x.jpg"),
            "https://static.feissarimokat.com/img/x.jpg"
        );
    }

    #[test]
    fn test_absolute_url_unchanged() {
        assert_eq!(
            normalize_image_url(DEFAULT_IMAGE_BASE_URL, "https://cdn.example.com/y.jpg"),
            "https://cdn.example.com/y.jpg"
        );
        assert_eq!(
            normalize_image_url(DEFAULT_IMAGE_BASE_URL, "http://cdn.example.com/y.jpg"),
            "http://cdn.example.com/y.jpg"
        );
    }

    #[test]
    fn test_join_uses_single_slash() {
        assert_eq!(
            normalize_image_url("https://static.example.com/", "/a.png"),
            "https://static.example.com/a.png"
        );
        assert_eq!(
            normalize_image_url("https://static.example.com", "a.png"),
            "https://static.example.com/a.png"
        );
    }

    #[test]
    fn test_only_postbody_images_in_document_order() {
        let images = extract_image_urls(POST_PAGE, &default_selector(), DEFAULT_IMAGE_BASE_URL);
        assert_eq!(
            images,
            vec![
                "https://static.feissarimokat.com/img/1.jpg".to_string(),
                "https://cdn.example.com/2.jpg".to_string(),
                "https://static.feissarimokat.com/img/3.gif".to_string(),
            ]
        );
    }

    #[test]
    fn test_blank_sources_never_become_base_origin() {
        let html = r#"<div class="postbody"><img src=""><img src=" &#9;"><img src="/ok.png"></div>"#;
        let images = extract_image_urls(html, &default_selector(), DEFAULT_IMAGE_BASE_URL);
        assert_eq!(images, vec!["https://static.feissarimokat.com/ok.png".to_string()]);
    }

    #[test]
    fn test_page_without_postbody_yields_nothing() {
        let html = r#"<html><body><img src="/img/1.jpg"></body></html>"#;
        let images = extract_image_urls(html, &default_selector(), DEFAULT_IMAGE_BASE_URL);
        assert!(images.is_empty());
    }

    #[test]
    fn test_custom_container_selector() {
        let selector = image_selector("article.entry").unwrap();
        let html = r#"<article class="entry"><img src="/a.jpg"></article>
<div class="postbody"><img src="/b.jpg"></div>"#;
        let images = extract_image_urls(html, &selector, "https://static.example.com");
        assert_eq!(images, vec!["https://static.example.com/a.jpg".to_string()]);
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let result = image_selector("div[");
        match result {
            Err(ConfigError::Selector { selector, .. }) => assert_eq!(selector, "div["),
            other => panic!("Expected Selector error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_extract_images_from_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2026/10/post/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(POST_PAGE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_client(&default_user_agent(), DEFAULT_TIMEOUT).unwrap();
        let extractor = ImageExtractor::new(
            client,
            mock_server.uri(),
            DEFAULT_CONTENT_SELECTOR,
            1024 * 1024,
        )
        .unwrap();

        let images = extractor
            .extract_images(&format!("{}/2026/10/post/", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(
            images,
            vec![
                format!("{}/img/1.jpg", mock_server.uri()),
                "https://cdn.example.com/2.jpg".to_string(),
                format!("{}/img/3.gif", mock_server.uri()),
            ]
        );
    }

    #[tokio::test]
    async fn test_page_error_is_recoverable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_client(&default_user_agent(), DEFAULT_TIMEOUT).unwrap();
        let extractor = ImageExtractor::new(
            client,
            DEFAULT_IMAGE_BASE_URL,
            DEFAULT_CONTENT_SELECTOR,
            1024 * 1024,
        )
        .unwrap();

        let err = extractor
            .extract_images(&format!("{}/gone", mock_server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.severity(), Severity::Recoverable);
        assert!(matches!(err, Error::Extract { .. }));
    }

    proptest! {
        #[test]
        fn prop_absolute_urls_pass_through(rest in "[a-z0-9./_-]{0,40}") {
            let src = format!("https://{}", rest);
            prop_assert_eq!(normalize_image_url(DEFAULT_IMAGE_BASE_URL, &src), src);
        }

        #[test]
        fn prop_relative_paths_become_absolute(segment in "[a-z0-9_-]{1,20}(/[a-z0-9_.-]{1,20}){0,3}") {
            let src = format!("/{}", segment);
            let normalized = normalize_image_url(DEFAULT_IMAGE_BASE_URL, &src);
            prop_assert!(normalized.starts_with("https://static.feissarimokat.com/"));
            prop_assert!(normalized.ends_with(&src));
            prop_assert!(!normalized.contains(".com//"));
        }
    }
}
