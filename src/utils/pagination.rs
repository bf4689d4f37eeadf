use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Raw paging parameters, kept as strings so that malformed values fall back
/// to defaults instead of failing extraction.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number; its presence switches to the paginated envelope
    pub page: Option<String>,
    /// Items per page; its presence switches to the paginated envelope
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    /// Maximum rows for the plain array response
    pub limit: Option<String>,
}

/// Clamp rule for Mode A (`limit`) responses.
#[derive(Debug, Clone, Copy)]
pub struct LimitRule {
    pub default: u64,
    pub max: u64,
}

/// Default/maximum page size for Mode B (`page`/`pageSize`) responses.
#[derive(Debug, Clone, Copy)]
pub struct PageRule {
    pub default_size: u64,
    pub max_size: u64,
}

/// Highest accepted `page`; anything above falls back to the first page.
pub const MAX_PAGE: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn window(&self) -> Window {
        Window::Page {
            limit: self.page_size,
            offset: self.offset(),
        }
    }
}

/// The only values ever inlined into SQL text: validated, bounded integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    All,
    Limit(u64),
    Page { limit: u64, offset: u64 },
}

impl Window {
    pub fn sql(&self) -> String {
        match self {
            Window::All => String::new(),
            Window::Limit(limit) => format!(" LIMIT {limit}"),
            Window::Page { limit, offset } => format!(" LIMIT {limit} OFFSET {offset}"),
        }
    }
}

impl PageParams {
    /// `page` or `pageSize` present means the caller wants the envelope.
    pub fn is_paginated(&self) -> bool {
        self.page.is_some() || self.page_size.is_some()
    }

    pub fn limit(&self, rule: LimitRule) -> u64 {
        clamp_limit(self.limit.as_deref(), rule)
    }

    pub fn page_request(&self, rule: PageRule) -> PageRequest {
        page_request(self.page.as_deref(), self.page_size.as_deref(), rule)
    }

    /// Same as [`page_request`](Self::page_request) but `limit` stands in for
    /// a missing `pageSize`.
    pub fn page_request_or_limit(&self, rule: PageRule) -> PageRequest {
        let size = self.page_size.as_deref().or(self.limit.as_deref());
        page_request(self.page.as_deref(), size, rule)
    }
}

/// Mode A row cap: unparsable input gets the default, anything else is clamped.
pub fn clamp_limit(raw: Option<&str>, rule: LimitRule) -> u64 {
    match raw.and_then(parse_whole) {
        Some(v) => v.clamp(1, rule.max as i64) as u64,
        None => rule.default,
    }
}

fn page_request(page: Option<&str>, page_size: Option<&str>, rule: PageRule) -> PageRequest {
    let page = match page.and_then(parse_whole) {
        Some(p) if p > 0 && p as u64 <= MAX_PAGE => p as u64,
        _ => 1,
    };
    let page_size = match page_size.and_then(parse_whole) {
        Some(s) if s > 0 && s as u64 <= rule.max_size => s as u64,
        _ => rule.default_size,
    };
    PageRequest { page, page_size }
}

/// Accepts "20" and "20.0"; rejects fractions, blanks and non-finite input.
fn parse_whole(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(v as i64),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}

/// Mode A serializes as a bare array, Mode B as the `{items,total,page,pageSize}` envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Items(Vec<T>),
    Page(Page<T>),
}
