//! Page/take pagination primitives shared by backend list endpoints.
//!
//! List endpoints accept 1-based `page` and `take` query parameters and reply
//! with a `pageInfo` envelope. The rules live here so every endpoint clamps
//! and reports pages the same way:
//!
//! - `page` and `take` must be at least 1; `take` is capped at [`MAX_TAKE`].
//! - `lastPage` is `ceil(total / take)`.
//! - A `page` past the end falls back to the first page rather than serving
//!   an empty slice.

use serde::{Deserialize, Serialize};

/// Upper bound for the `take` parameter.
pub const MAX_TAKE: u32 = 100;

/// Validation failures for page parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageParamsError {
    /// `page` was zero.
    #[error("page must be greater than 0")]
    PageOutOfRange,
    /// `take` was zero or above [`MAX_TAKE`].
    #[error("take must be between 1 and {MAX_TAKE}")]
    TakeOutOfRange,
}

/// Validated pagination request: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: u32,
    take: u32,
}

impl PageParams {
    /// Validate raw `page`/`take` values.
    pub fn new(page: u32, take: u32) -> Result<Self, PageParamsError> {
        if page == 0 {
            return Err(PageParamsError::PageOutOfRange);
        }
        if take == 0 || take > MAX_TAKE {
            return Err(PageParamsError::TakeOutOfRange);
        }
        Ok(Self { page, take })
    }

    /// Requested 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    pub fn take(&self) -> u32 {
        self.take
    }
}

/// Pagination metadata reported alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total number of records matching the filter.
    pub total: u64,
    /// The page actually served (clamped into range).
    pub current_page: u32,
    /// Last page number, or 0 when there are no records.
    pub last_page: u32,
    /// Number of records per page.
    pub per_page: u64,
}

impl PageInfo {
    /// Describe an unpaginated result: everything on one page.
    pub fn unpaginated(total: u64) -> Self {
        Self {
            total,
            current_page: u32::from(total > 0),
            last_page: u32::from(total > 0),
            per_page: total,
        }
    }

    /// Compute the page metadata for `total` records under `params`.
    ///
    /// A requested page past the last page is clamped back to page 1, which
    /// matches the offset fallback in [`PageParams::offset`].
    pub fn compute(total: u64, params: PageParams) -> Self {
        let take = u64::from(params.take());
        let last_page = u32::try_from(total.div_ceil(take)).unwrap_or(u32::MAX);
        let current_page = if total == 0 {
            0
        } else if params.page() > last_page {
            1
        } else {
            params.page()
        };
        Self {
            total,
            current_page,
            last_page,
            per_page: take,
        }
    }
}

impl PageParams {
    /// Zero-based offset into the result set, falling back to the start when
    /// the requested page lies past the end.
    pub fn offset(&self, total: u64) -> u64 {
        let skip = u64::from(self.page - 1) * u64::from(self.take);
        if skip < total {
            skip
        } else {
            0
        }
    }
}

/// One page of results plus its metadata.
///
/// Serialized as `{"pageInfo": …, "items": […]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_info: PageInfo,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Bundle items with their page metadata.
    pub fn new(page_info: PageInfo, items: Vec<T>) -> Self {
        Self { page_info, items }
    }

    /// Paginate an already-filtered, already-ordered in-memory collection.
    pub fn slice(items: Vec<T>, params: Option<PageParams>) -> Self {
        let total = items.len() as u64;
        match params {
            None => Self::new(PageInfo::unpaginated(total), items),
            Some(params) => {
                let info = PageInfo::compute(total, params);
                let offset = usize::try_from(params.offset(total)).unwrap_or(usize::MAX);
                let items = items
                    .into_iter()
                    .skip(offset)
                    .take(params.take() as usize)
                    .collect();
                Self::new(info, items)
            }
        }
    }
}
