//! Index build and query behaviour against a real on-disk store

mod common;

use common::{author, listing_page, numbered_records, record};
use pubindex::config::TargetConfig;
use pubindex::indexer::store;
use pubindex::record::PublicationRecord;
use pubindex::{Extractor, SearchOutcome, Searcher, build_index};
use std::collections::HashSet;
use tempfile::TempDir;

fn climate_and_smith() -> Vec<PublicationRecord> {
    vec![
        record(
            "Climate risk and bank lending",
            "climate-risk",
            vec![author("Alice Brown", "alice-brown")],
            "2 Feb 2024",
        ),
        record(
            "Monetary policy transmission",
            "monetary-policy",
            vec![author("John Smith", "john-smith")],
            "5 May 2023",
        ),
        record(
            "Household debt dynamics",
            "household-debt",
            vec![author("Carol White", "carol-white")],
            "Unknown",
        ),
    ]
}

fn titles(outcome: &SearchOutcome) -> Vec<&str> {
    outcome.records().iter().map(|r| r.title.as_str()).collect()
}

#[test]
fn blank_query_lists_everything_up_to_the_limit() {
    let dir = TempDir::new().unwrap();
    let records = numbered_records(25);
    build_index(&records, dir.path()).unwrap();

    let results = Searcher::open(dir.path(), 20).search("").into_records();

    assert_eq!(results.len(), 20);
    for (result, expected) in results.into_iter().zip(&records) {
        assert_eq!(&result.into_publication(), expected);
    }
}

#[test]
fn blank_query_on_small_index_returns_all_records() {
    let dir = TempDir::new().unwrap();
    let records = climate_and_smith();
    build_index(&records, dir.path()).unwrap();

    let results = Searcher::open(dir.path(), 20).search("   \t").into_records();

    let found: Vec<PublicationRecord> = results.into_iter().map(|r| r.into_publication()).collect();
    assert_eq!(found, records);
}

#[test]
fn title_and_author_queries_are_combined_with_or() {
    let dir = TempDir::new().unwrap();
    build_index(&climate_and_smith(), dir.path()).unwrap();
    let searcher = Searcher::open(dir.path(), 20);

    assert_eq!(titles(&searcher.search("climate")), ["Climate risk and bank lending"]);
    assert_eq!(
        titles(&searcher.search("climate OR nonexistent")),
        ["Climate risk and bank lending"]
    );
    // "Smith" is in no title, only in the authors field.
    assert_eq!(titles(&searcher.search("Smith")), ["Monetary policy transmission"]);

    let either: HashSet<String> = searcher
        .search("climate OR smith")
        .into_records()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(either.len(), 2);
}

#[test]
fn words_are_implicitly_anded_within_a_field() {
    let dir = TempDir::new().unwrap();
    build_index(&climate_and_smith(), dir.path()).unwrap();
    let searcher = Searcher::open(dir.path(), 20);

    assert_eq!(titles(&searcher.search("climate lending")), ["Climate risk and bank lending"]);
    assert_eq!(searcher.search("climate monetary"), SearchOutcome::NoMatches);
}

#[test]
fn quoted_phrases_match_in_order() {
    let dir = TempDir::new().unwrap();
    build_index(&climate_and_smith(), dir.path()).unwrap();
    let searcher = Searcher::open(dir.path(), 20);

    assert_eq!(
        titles(&searcher.search("\"bank lending\"")),
        ["Climate risk and bank lending"]
    );
    assert_eq!(searcher.search("\"lending bank\""), SearchOutcome::NoMatches);
    assert_eq!(titles(&searcher.search("\"john smith\"")), ["Monetary policy transmission"]);
}

#[test]
fn authors_come_back_structured() {
    let dir = TempDir::new().unwrap();
    build_index(&climate_and_smith(), dir.path()).unwrap();

    let results = Searcher::open(dir.path(), 20).search("smith").into_records();

    assert_eq!(results[0].authors, vec![author("John Smith", "john-smith")]);
    assert_eq!(results[0].date, "5 May 2023");
    assert!(results[0].score > 0.0);
}

#[test]
fn unknown_term_is_no_match_not_failure() {
    let dir = TempDir::new().unwrap();
    build_index(&climate_and_smith(), dir.path()).unwrap();

    let outcome = Searcher::open(dir.path(), 20).search("zebra");

    assert_eq!(outcome, SearchOutcome::NoMatches);
    assert!(outcome.is_available());
}

#[test]
fn rebuilding_replaces_the_previous_generation() {
    let dir = TempDir::new().unwrap();
    let records = numbered_records(15);

    let first = build_index(&records, dir.path()).unwrap();
    let second = build_index(&records, dir.path()).unwrap();
    assert_eq!(second.number, first.number + 1);
    assert!(!first.path.exists());

    let results = Searcher::open(dir.path(), 20).search("").into_records();
    let links: HashSet<&str> = results.iter().map(|r| r.link.as_str()).collect();
    assert_eq!(results.len(), 15);
    assert_eq!(links.len(), results.len());
}

#[test]
fn new_generation_drops_records_missing_from_the_new_crawl() {
    let dir = TempDir::new().unwrap();
    build_index(&climate_and_smith(), dir.path()).unwrap();
    build_index(&numbered_records(2), dir.path()).unwrap();

    let searcher = Searcher::open(dir.path(), 20);

    assert_eq!(searcher.search("climate"), SearchOutcome::NoMatches);
    assert_eq!(searcher.search("").records().len(), 2);
}

#[test]
fn empty_build_then_search_is_empty_without_error() {
    let dir = TempDir::new().unwrap();
    build_index(&[], dir.path()).unwrap();
    let searcher = Searcher::open(dir.path(), 20);

    assert_eq!(searcher.search(""), SearchOutcome::NoMatches);
    assert_eq!(searcher.search("climate"), SearchOutcome::NoMatches);
}

#[test]
fn missing_or_corrupt_store_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let searcher = Searcher::open(dir.path(), 20);
    assert!(matches!(searcher.search("climate"), SearchOutcome::EngineUnavailable(_)));

    build_index(&climate_and_smith(), dir.path()).unwrap();
    std::fs::write(dir.path().join("CURRENT"), "gen-99\n").unwrap();
    assert!(matches!(searcher.search(""), SearchOutcome::EngineUnavailable(_)));
}

#[test]
fn corrupt_pointer_is_recovered_by_the_next_build() {
    let dir = TempDir::new().unwrap();
    let first = build_index(&numbered_records(3), dir.path()).unwrap();
    std::fs::write(dir.path().join("CURRENT"), "garbage").unwrap();
    let searcher = Searcher::open(dir.path(), 20);
    assert!(matches!(searcher.search("climate"), SearchOutcome::EngineUnavailable(_)));

    let second = build_index(&climate_and_smith(), dir.path()).unwrap();

    assert_eq!(second.number, first.number + 1);
    assert!(!first.path.exists());
    assert_eq!(titles(&searcher.search("climate")), ["Climate risk and bank lending"]);
    assert_eq!(searcher.search("").records().len(), 3);
}

#[test]
fn store_directory_is_created_on_demand() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("var").join("index");

    let generation = build_index(&climate_and_smith(), &nested).unwrap();

    assert_eq!(generation.documents, 3);
    assert_eq!(store::current_generation(&nested).unwrap(), Some(generation.number));
}

#[test]
fn extracted_relative_links_are_stored_absolute() {
    let markup = listing_page(&[
        (
            "Climate risk and bank lending",
            "/en/publications/climate-risk",
            &[("Alice Brown", "/en/persons/alice-brown")],
            Some("2 Feb 2024"),
        ),
        (
            "Monetary policy transmission",
            "/en/publications/monetary-policy",
            &[
                ("John Smith", "/en/persons/john-smith"),
                ("", "/en/persons/ghost"),
                ("Dana Grey", "https://orcid.org/0000-0000"),
            ],
            None,
        ),
    ]);
    let records = Extractor::new(&TargetConfig::default()).unwrap().extract(&markup);
    assert_eq!(records.len(), 2);

    let dir = TempDir::new().unwrap();
    build_index(&records, dir.path()).unwrap();
    let results = Searcher::open(dir.path(), 20).search("").into_records();

    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.link.starts_with("http"), "{}", result.link);
        for author in &result.authors {
            assert!(author.profile_link.starts_with("http"), "{}", author.profile_link);
        }
    }
    assert_eq!(results[1].authors.len(), 2);
    assert_eq!(results[1].date, "Unknown");
}
