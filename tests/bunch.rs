use assert_matches::assert_matches;

use geodatasets::bunch::{Bunch, DatasetFilter};
use geodatasets::catalog;
use geodatasets::error::GeoDatasetsError;

const DEFINITION: &str = r#"{
    "geoda": {
        "airbnb": {
            "name": "geoda.airbnb",
            "url": "https://x/airbnb.zip",
            "hash": "sha1:abc",
            "filename": "airbnb.zip",
            "geometry_type": "Polygon",
            "description": "Airbnb rentals in Chicago",
            "nrows": 77
        },
        "cars": {
            "name": "geoda.cars",
            "url": "https://x/cars.csv",
            "hash": "sha1:def",
            "filename": "cars.csv",
            "geometry_type": "Point",
            "description": "Abandoned vehicles, CSV export",
            "nrows": 137867
        }
    },
    "eea": {
        "large_rivers": {
            "name": "eea.large_rivers",
            "url": "https://x/rivers.zip",
            "hash": "sha1:123",
            "filename": "rivers.zip",
            "geometry_type": "LineString",
            "nrows": 20
        }
    },
    "nybb": {
        "name": "nybb",
        "url": "https://x/nybb.zip",
        "hash": "sha1:456",
        "filename": "nybb.zip",
        "geometry_type": "Polygon",
        "nrows": 5
    }
}"#;

fn catalog() -> Bunch {
    catalog::load_json(DEFINITION).unwrap()
}

#[test]
fn query_ignores_case_and_separators() {
    let bunch = catalog();
    let expected = bunch.query_name("geoda.airbnb").unwrap();
    for query in ["GeoDa AirBnB", "geoda_airbnb", "geoda-air-bnb", "GEODA/AIRBNB", "geoda,airbnb"] {
        assert_eq!(bunch.query_name(query).unwrap(), expected, "query {query}");
    }
}

#[test]
fn unknown_query_reports_the_literal_query() {
    let err = catalog().query_name("does-not-exist-xyz").unwrap_err();
    assert_matches!(&err, GeoDatasetsError::NotFound { query } if query == "does-not-exist-xyz");
    assert_eq!(
        err.to_string(),
        "No matching item found for the query 'does-not-exist-xyz'."
    );
}

#[test]
fn query_requires_the_same_letters() {
    assert!(catalog().query_name("geoda airbn").is_err());
    assert!(catalog().query_name("airbnb").is_err());
}

#[test]
fn filter_by_geometry_type() {
    let bunch = catalog();
    let points = bunch.filter(&DatasetFilter::new().geometry_type("Point"));
    let names = points.flatten().keys().copied().collect::<Vec<_>>();
    assert_eq!(names, vec!["geoda.cars"]);
    for dataset in points.flatten().values() {
        assert_eq!(dataset.geometry_type().unwrap().to_uppercase(), "POINT");
    }

    let lines = bunch.filter(&DatasetFilter::new().geometry_type("line_string"));
    assert_eq!(lines.dataset_count(), 1);
}

#[test]
fn filter_keeps_tree_shape_and_identity() {
    let bunch = catalog();
    let filtered = bunch.filter(&DatasetFilter::new().geometry_type("polygon"));
    assert!(filtered.dataset_count() <= bunch.dataset_count());
    assert_eq!(filtered.len(), 2);
    assert!(filtered.get("eea").is_none());

    let geoda = filtered.get("geoda").unwrap().as_bunch().unwrap();
    let airbnb = geoda.get("airbnb").unwrap().as_dataset().unwrap();
    assert_eq!(airbnb, bunch.query_name("geoda.airbnb").unwrap());
}

#[test]
fn conditions_are_combined() {
    let bunch = catalog();
    let csv = bunch.filter(&DatasetFilter::new().keyword("CSV"));
    assert_eq!(csv.dataset_count(), 1);

    let both = bunch.filter(&DatasetFilter::new().name("GEODA").geometry_type("Polygon"));
    let names = both.flatten().keys().copied().collect::<Vec<_>>();
    assert_eq!(names, vec!["geoda.airbnb"]);

    let none = bunch.filter(&DatasetFilter::new().name("geoda").keyword("rivers"));
    assert!(none.is_empty());
}

#[test]
fn custom_function_filter() {
    let small = catalog().filter(
        &DatasetFilter::new().function(|dataset| dataset.nrows().map(|rows| rows < 100).unwrap_or(false)),
    );
    let names = small.flatten().keys().copied().collect::<Vec<_>>();
    assert_eq!(names, vec!["geoda.airbnb", "eea.large_rivers", "nybb"]);
}

#[test]
fn empty_filter_keeps_everything() {
    let bunch = catalog();
    assert_eq!(bunch.filter(&DatasetFilter::new()), bunch);
}

#[test]
fn normalized_name_collision_keeps_the_last_entry() {
    let bunch = catalog::load_json(
        r#"{
            "a": {"name": "ab.c", "url": "first", "hash": "h", "filename": "f"},
            "b": {"name": "a.bc", "url": "second", "hash": "h", "filename": "f"}
        }"#,
    )
    .unwrap();
    assert_eq!(bunch.query_name("abc").unwrap().url(), "second");
}

#[test]
fn duplicate_names_collapse_in_flatten() {
    let bunch = catalog::load_json(
        r#"{
            "one": {"x": {"name": "dup", "url": "first", "hash": "h", "filename": "f"}},
            "two": {"x": {"name": "dup", "url": "second", "hash": "h", "filename": "f"}}
        }"#,
    )
    .unwrap();
    assert_eq!(bunch.dataset_count(), 2);
    let flat = bunch.flatten();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat["dup"].url(), "second");
}
