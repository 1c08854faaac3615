//! Property-based tests for browse queries

use ecofinds::shared::marketplace::listing::MAX_PAGE_SIZE;
use ecofinds::shared::marketplace::{Category, Listing, ListingParams, ListingQuery, NewListing};
use proptest::prelude::*;
use uuid::Uuid;

fn category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn listing(title: String, category: Category, available: bool) -> Listing {
    let mut listing = Listing::new(
        Uuid::new_v4(),
        NewListing {
            title,
            description: "plain".to_string(),
            category,
            price: 1.0,
            image_url: None,
        },
    );
    listing.is_available = available;
    listing
}

proptest! {
    #[test]
    fn test_page_and_limit_are_clamped(
        page in prop::option::of(any::<u32>()),
        limit in prop::option::of(any::<u32>()),
    ) {
        let query = ListingQuery::from_params(ListingParams {
            page,
            limit,
            ..ListingParams::default()
        }).unwrap();

        prop_assert!(query.page >= 1);
        prop_assert!((1..=MAX_PAGE_SIZE).contains(&query.limit));
        prop_assert_eq!(
            query.offset(),
            u64::from(query.page - 1) * u64::from(query.limit)
        );
    }

    #[test]
    fn test_unavailable_listings_never_match(
        title in "[a-zA-Z ]{1,20}",
        category in category(),
    ) {
        let sold = listing(title.clone(), category, false);
        let query = ListingQuery {
            search: Some(title.trim().to_string()).filter(|s| !s.is_empty()),
            category: Some(category),
            ..ListingQuery::default()
        };
        prop_assert!(!query.matches(&sold));
        prop_assert!(!ListingQuery::default().matches(&sold));
    }

    #[test]
    fn test_search_is_case_insensitive(
        title in "[a-zA-Z]{1,20}",
        category in category(),
    ) {
        let item = listing(title.clone(), category, true);
        for needle in [title.to_uppercase(), title.to_lowercase()] {
            let query = ListingQuery::from_params(ListingParams {
                search: Some(needle),
                ..ListingParams::default()
            }).unwrap();
            prop_assert!(query.matches(&item));
        }
    }

    #[test]
    fn test_category_names_parse_case_insensitively(category in category()) {
        let shouted = category.as_str().to_uppercase();
        prop_assert_eq!(shouted.parse::<Category>().ok(), Some(category));
    }
}
