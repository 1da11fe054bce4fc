use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, INVALID_PAGE};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipes_limit: Option<u32>,
}

/// 1-based page number plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn from_query(query: &PageQuery, default_limit: i64) -> Result<Self, ServiceError> {
        let page = i64::from(query.page.unwrap_or(1));
        if page < 1 {
            return Err(ServiceError::NotFound(INVALID_PAGE));
        }
        let limit = match query.limit {
            Some(limit) if limit > 0 => i64::from(limit),
            _ => default_limit,
        };
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Pages past the end are rejected, except the first page of an empty list.
    pub fn check_in_range(&self, count: i64) -> Result<(), ServiceError> {
        if self.page > 1 && self.offset() >= count {
            return Err(ServiceError::NotFound(INVALID_PAGE));
        }
        Ok(())
    }
}

/// Absolute URL of the request path, without its query string.
pub fn page_base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), req.path())
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// `extra` query parameters are carried into the next/previous links.
    pub fn new(
        base_url: &str,
        request: PageRequest,
        count: i64,
        results: Vec<T>,
        extra: &[(&str, u32)],
    ) -> Self {
        let link = |page: i64| {
            let mut url = format!("{}?page={}&limit={}", base_url, page, request.limit);
            for (key, value) in extra {
                url.push_str(&format!("&{}={}", key, value));
            }
            url
        };
        let next = (request.page * request.limit < count).then(|| link(request.page + 1));
        let previous = (request.page > 1).then(|| link(request.page - 1));
        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<u32>, limit: Option<u32>) -> PageQuery {
        PageQuery {
            page,
            limit,
            recipes_limit: None,
        }
    }

    #[test]
    fn defaults_to_first_page() {
        let request = PageRequest::from_query(&query(None, None), 6).unwrap();

        assert_eq!(request, PageRequest { page: 1, limit: 6 });
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn page_zero_is_invalid() {
        assert!(matches!(
            PageRequest::from_query(&query(Some(0), None), 6),
            Err(ServiceError::NotFound(INVALID_PAGE))
        ));
    }

    #[test]
    fn pages_past_the_end_are_invalid() {
        let request = PageRequest::from_query(&query(Some(3), Some(2)), 6).unwrap();

        assert!(request.check_in_range(4).is_err());
        assert!(request.check_in_range(5).is_ok());
        assert!(PageRequest { page: 1, limit: 2 }.check_in_range(0).is_ok());
    }

    #[test]
    fn links_keep_extra_parameters() {
        let request = PageRequest { page: 2, limit: 2 };
        let base = "http://foodgram.test/api/users/subscriptions";
        let page = Paginated::new(base, request, 5, vec![1, 2], &[("recipes_limit", 3)]);

        assert_eq!(
            page.next.as_deref(),
            Some("http://foodgram.test/api/users/subscriptions?page=3&limit=2&recipes_limit=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://foodgram.test/api/users/subscriptions?page=1&limit=2&recipes_limit=3")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let page = Paginated::new("http://h/x", PageRequest { page: 3, limit: 2 }, 5, vec![5], &[]);

        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("http://h/x?page=2&limit=2"));
    }

    #[test]
    fn base_url_uses_scheme_and_host() {
        let req = actix_web::test::TestRequest::get()
            .uri("/api/users/subscriptions?page=2&limit=1")
            .insert_header(("host", "foodgram.test"))
            .to_http_request();

        assert_eq!(page_base_url(&req), "http://foodgram.test/api/users/subscriptions");
    }
}
