use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Requested page, normalised: `page >= 1`, `page_size` in `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

/// Concrete slice of a result set once the total is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Result<Self> {
        Ok(Self::new(
            parse_query_i64("page", page)?,
            parse_query_i64("page_size", page_size)?,
        ))
    }

    /// There is always at least one (possibly empty) page, and a page past
    /// the end is clamped to the last one.
    pub fn window(&self, total: i64) -> PageWindow {
        let total_pages = if total <= 0 {
            1
        } else {
            (total + self.page_size - 1) / self.page_size
        };
        let page = self.page.min(total_pages);
        PageWindow {
            page,
            total_pages,
            limit: self.page_size,
            offset: (page - 1) * self.page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, window: PageWindow) -> Self {
        Self {
            count,
            total_pages: window.total_pages,
            current_page: window.page,
            results,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            count: self.count,
            total_pages: self.total_pages,
            current_page: self.current_page,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Blank values count as absent.
pub fn parse_query_i64(name: &str, raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::BadRequest(format!("{} must be an integer, got '{}'", name, value))),
    }
}
