use serde_json::json;
use zoolight_catalog::search::search;
use zoolight_catalog::{
    AnimalDetail, AnimalRecord, ResultsView, SearchController, NO_RESULTS,
};

fn dataset() -> Vec<AnimalRecord> {
    serde_json::from_value(json!([
        {"Common Name": "Lion", "image": "u1", "Habitat": "Savanna"},
        {"Common Name": "Tiger", "image": "u2"},
        {"Common Name": "Tiny Owl", "image": ""},
        {"Kingdom": "Animalia"},
        {"Common Name": "SNOW LEOPARD", "Diet": "Carnivore"},
        {"Common Name": "Leopard Gecko"},
        {"Common Name": ""},
        {"Common Name": "Çhamois"}
    ]))
    .expect("fixture decodes")
}

fn loaded() -> SearchController {
    let mut ctl = SearchController::new();
    ctl.begin_load();
    ctl.load(dataset());
    ctl
}

fn names(ctl: &SearchController) -> Vec<String> {
    ctl.filtered()
        .map(|r| r.common_name().unwrap_or("<none>").to_string())
        .collect()
}

#[test]
fn blank_queries_reset_to_the_full_dataset() {
    let data = dataset();
    let mut ctl = loaded();
    for q in ["", " ", "\t\n", "   "] {
        ctl.set_query("tig");
        ctl.run_search();
        ctl.set_query(q);
        ctl.run_search();
        let all: Vec<_> = ctl.filtered().cloned().collect();
        assert_eq!(all, data, "query {q:?}");
    }
}

#[test]
fn results_are_exactly_the_matching_records_in_order() {
    let data = dataset();
    for q in ["tin", "LEO", " leopard ", "o", "gecko", "zebra", "ç", "Owl"] {
        let hits = search(&data, q);
        let needle = q.trim().to_lowercase();

        // ascending positions == dataset order
        assert!(hits.windows(2).all(|w| w[0] < w[1]), "query {q:?}");

        for (pos, rec) in data.iter().enumerate() {
            let matches = rec
                .common_name()
                .is_some_and(|n| n.to_lowercase().contains(&needle));
            assert_eq!(hits.contains(&pos), matches, "query {q:?}, record {pos}");
        }
    }
}

#[test]
fn running_twice_changes_nothing() {
    let mut ctl = loaded();
    ctl.set_query("leo");
    ctl.run_search();
    let first = names(&ctl);
    ctl.run_search();
    assert_eq!(names(&ctl), first);
    assert_eq!(first, vec!["SNOW LEOPARD", "Leopard Gecko"]);
}

#[test]
fn tin_matches_only_tiny_owl() {
    let mut ctl = loaded();
    ctl.set_query("tin");
    ctl.run_search();
    assert_eq!(names(&ctl), vec!["Tiny Owl"]);

    ctl.set_query("ti");
    ctl.run_search();
    assert_eq!(names(&ctl), vec!["Tiger", "Tiny Owl"]);
}

#[test]
fn select_then_deselect_restores_the_view() {
    let mut ctl = loaded();
    ctl.set_query("o");
    ctl.run_search();
    let query = ctl.query().to_string();
    let filtered = names(&ctl);

    ctl.select(2);
    assert!(ctl.selected().is_some());
    ctl.deselect();

    assert!(ctl.selected().is_none());
    assert_eq!(ctl.query(), query);
    assert_eq!(names(&ctl), filtered);
}

#[test]
fn failed_fetch_shows_no_animals_found() {
    let mut ctl = SearchController::new();
    ctl.begin_load();
    ctl.fail_load("connection reset");
    match ctl.results() {
        ResultsView::Empty { message, .. } => assert_eq!(message, "No animals found."),
        ResultsView::Cards(_) => panic!("expected empty view"),
    }
    assert_eq!(NO_RESULTS, "No animals found.");
}

#[test]
fn detail_panel_for_sparse_record() {
    let data = dataset();
    let tiger = AnimalDetail::new(&data[1]);
    assert_eq!(tiger.title(), "Tiger");
    assert_eq!(tiger.habitat_line(), "Habitat: N/A. Diet: N/A.");

    let nameless = AnimalDetail::new(&data[3]);
    assert_eq!(nameless.title(), "Animal");
    assert!(nameless.taxonomy_line().starts_with("Kingdom: Animalia. Phylum: N/A."));
}
