//! Response envelopes for the JSON API.

use serde::Serialize;
use serde_json::Value;

/// Rows per listing page.
pub const PAGE_SIZE: u32 = 10;

/// Paginated listing: `{items, currentPage, totalPages, totalItems}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBody {
    pub items: Vec<Value>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub username: String,
}

pub fn total_pages(total_items: u64, page_size: u32) -> u64 {
    let size = u64::from(page_size.max(1));
    total_items.div_ceil(size)
}

/// 1-based page from the raw query value. Missing, unparsable or below 1 gives 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&n| n >= 1)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(0, PAGE_SIZE), 0);
        assert_eq!(total_pages(10, PAGE_SIZE), 1);
        assert_eq!(total_pages(11, PAGE_SIZE), 2);
        assert_eq!(total_pages(23, PAGE_SIZE), 3);
    }

    #[test]
    fn page_parameter_falls_back_to_first() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-4")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
    }

    #[test]
    fn page_body_is_camel_case() {
        let body = PageBody {
            items: vec![],
            current_page: 2,
            total_pages: 3,
            total_items: 23,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"items": [], "currentPage": 2, "totalPages": 3, "totalItems": 23})
        );
    }
}
