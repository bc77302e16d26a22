//! Pagination metadata and its side-channel header encoding.
//!
//! The server reports paging state in a response header of the form
//! `page=P,pageSize=N,totalCount=T,totalPages=W`. Pairs are comma separated,
//! their order is not significant, unknown keys are ignored, and all four
//! keys must be present for the metadata to count as present.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Paging state reported by the server for one listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PaginationMetadata {
    /// Builds metadata for a listing, deriving `total_pages`.
    #[must_use]
    pub fn for_listing(page: u32, page_size: u32, total_count: u64) -> Self {
        Self {
            page,
            page_size,
            total_count,
            total_pages: expected_total_pages(total_count, page_size),
        }
    }

    /// Parses the header value.
    pub fn parse(header: &str) -> Result<Self> {
        let mut page = None;
        let mut page_size = None;
        let mut total_count = None;
        let mut total_pages = None;

        for pair in header.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::InvalidPaginationHeader(format!("malformed pair `{}`", pair.trim())))?;
            let key = key.trim();
            let value: u64 = value.trim().parse().map_err(|_| {
                Error::InvalidPaginationHeader(format!("`{key}` is not an integer: `{}`", value.trim()))
            })?;

            match key {
                "page" => page = Some(value),
                "pageSize" => page_size = Some(value),
                "totalCount" => total_count = Some(value),
                "totalPages" => total_pages = Some(value),
                _ => {}
            }
        }

        let missing = |name: &str| Error::InvalidPaginationHeader(format!("missing `{name}`"));
        let page = narrow(page.ok_or_else(|| missing("page"))?, "page")?;
        let page_size = narrow(page_size.ok_or_else(|| missing("pageSize"))?, "pageSize")?;

        Ok(Self {
            page,
            page_size,
            total_count: total_count.ok_or_else(|| missing("totalCount"))?,
            total_pages: total_pages.ok_or_else(|| missing("totalPages"))?,
        })
    }

    /// Returns true if `total_pages == ceil(total_count / page_size)`.
    pub fn is_consistent(&self) -> bool {
        self.total_pages == expected_total_pages(self.total_count, self.page_size)
    }
}

/// `page` and `pageSize` must be positive and fit the cursor's width.
fn narrow(value: u64, key: &str) -> Result<u32> {
    match u32::try_from(value) {
        Ok(0) => Err(Error::InvalidPaginationHeader(format!("`{key}` must be positive"))),
        Ok(v) => Ok(v),
        Err(_) => Err(Error::InvalidPaginationHeader(format!("`{key}` out of range: {value}"))),
    }
}

/// `ceil(total_count / page_size)`; zero pages for a zero page size.
pub fn expected_total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

impl fmt::Display for PaginationMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page={},pageSize={},totalCount={},totalPages={}",
            self.page, self.page_size, self.total_count, self.total_pages
        )
    }
}

impl FromStr for PaginationMetadata {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
