use proptest::prelude::*;
use roster_types::{expected_total_pages, Error, PaginationMetadata};

// ── Header parsing ───────────────────────────────────────────────

#[test]
fn parse_canonical_header() {
    let meta = PaginationMetadata::parse("page=1,pageSize=5,totalCount=12,totalPages=3").unwrap();
    assert_eq!(meta.page, 1);
    assert_eq!(meta.page_size, 5);
    assert_eq!(meta.total_count, 12);
    assert_eq!(meta.total_pages, 3);
    assert!(meta.is_consistent());
}

#[test]
fn parse_is_order_insensitive_and_tolerates_whitespace() {
    let meta = PaginationMetadata::parse(" totalPages = 3, totalCount=12 ,pageSize=5 , page= 2").unwrap();
    assert_eq!(meta, PaginationMetadata::for_listing(2, 5, 12));
}

#[test]
fn parse_ignores_unknown_keys() {
    let meta = PaginationMetadata::parse("page=1,pageSize=5,totalCount=0,totalPages=0,hasNext=0").unwrap();
    assert_eq!(meta.total_count, 0);
}

#[test]
fn parse_requires_all_four_keys() {
    let err = PaginationMetadata::parse("page=1,pageSize=5,totalCount=12").unwrap_err();
    assert!(matches!(err, Error::InvalidPaginationHeader(msg) if msg.contains("totalPages")));
}

#[test]
fn parse_rejects_non_integer() {
    assert!(PaginationMetadata::parse("page=one,pageSize=5,totalCount=12,totalPages=3").is_err());
}

#[test]
fn parse_rejects_malformed_pair() {
    assert!(PaginationMetadata::parse("page=1,pageSize,totalCount=12,totalPages=3").is_err());
}

#[test]
fn parse_rejects_zero_page_size() {
    assert!(PaginationMetadata::parse("page=1,pageSize=0,totalCount=12,totalPages=3").is_err());
}

#[test]
fn parse_empty_header_fails() {
    assert!(PaginationMetadata::parse("").is_err());
}

#[test]
fn from_str_matches_parse() {
    let meta: PaginationMetadata = "page=2,pageSize=10,totalCount=15,totalPages=2".parse().unwrap();
    assert_eq!(meta, PaginationMetadata::for_listing(2, 10, 15));
}

#[test]
fn inconsistent_total_pages_is_detected() {
    let meta = PaginationMetadata::parse("page=1,pageSize=5,totalCount=12,totalPages=7").unwrap();
    assert!(!meta.is_consistent());
}

// ── Display ──────────────────────────────────────────────────────

#[test]
fn display_uses_header_format() {
    let meta = PaginationMetadata::for_listing(1, 5, 12);
    assert_eq!(meta.to_string(), "page=1,pageSize=5,totalCount=12,totalPages=3");
}

#[test]
fn serde_uses_camel_case() {
    let json = serde_json::to_value(PaginationMetadata::for_listing(1, 5, 12)).unwrap();
    assert_eq!(json["pageSize"], 5);
    assert_eq!(json["totalCount"], 12);
}

// ── Total pages ──────────────────────────────────────────────────

#[test]
fn expected_total_pages_rounds_up() {
    assert_eq!(expected_total_pages(0, 5), 0);
    assert_eq!(expected_total_pages(5, 5), 1);
    assert_eq!(expected_total_pages(6, 5), 2);
    assert_eq!(expected_total_pages(12, 5), 3);
    assert_eq!(expected_total_pages(12, 0), 0);
}

proptest! {
    #[test]
    fn header_display_parses_back(page in 1u32..10_000, size in 1u32..500, total in 0u64..1_000_000) {
        let meta = PaginationMetadata::for_listing(page, size, total);
        let parsed = PaginationMetadata::parse(&meta.to_string()).unwrap();
        prop_assert_eq!(parsed, meta);
        prop_assert!(parsed.is_consistent());
    }

    #[test]
    fn total_pages_covers_every_record(total in 0u64..1_000_000, size in 1u32..500) {
        let pages = expected_total_pages(total, size);
        prop_assert!(pages * u64::from(size) >= total);
        prop_assert!(pages == 0 || (pages - 1) * u64::from(size) < total);
    }
}
