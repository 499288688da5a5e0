//! Utility functions and helpers.

pub mod clock;
pub mod http;
pub mod log;

use url::Url;

use crate::error::Result;

/// Upstream list endpoint, relative to a region's base URL.
pub const NEWS_LIST_PATH: &str = "/api/resource/news";

/// Upstream detail endpoint, relative to a region's base URL.
pub const NEWS_DETAIL_PATH: &str = "/api/resource/news/detail";

/// Append an endpoint path to a base URL, keeping any base path prefix.
pub fn endpoint(base: &Url, path: &str) -> Result<Url> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Ok(Url::parse(&joined)?)
}

/// `GET {base}/api/resource/news?type=&index=&size=`
pub fn build_list_url(base: &Url, news_type: &str, index: u32, size: u32) -> Result<Url> {
    let mut url = endpoint(base, NEWS_LIST_PATH)?;
    url.query_pairs_mut()
        .append_pair("type", news_type)
        .append_pair("index", &index.to_string())
        .append_pair("size", &size.to_string());
    Ok(url)
}

/// `GET {base}/api/resource/news/detail?id=`
pub fn build_detail_url(base: &Url, id: i64) -> Result<Url> {
    let mut url = endpoint(base, NEWS_DETAIL_PATH)?;
    url.query_pairs_mut().append_pair("id", &id.to_string());
    Ok(url)
}
