//! End-to-end import of the full catalog against an in-memory source

use holoload::catalog::{LoadPlan, Resource};
use holoload::fetch::{CachedSource, StaticSource};
use holoload::storage::SqliteStore;
use holoload::{EntityRecord, Error, Importer};
use rusqlite::types::Value as SqlValue;
use serde_json::{Value, json};
use std::collections::HashMap;

const BASE: &str = "https://swapi.test/api";

fn api(path: &str) -> String {
    format!("{}/{}/", BASE, path)
}

fn records(values: Vec<Value>) -> Vec<EntityRecord> {
    values
        .into_iter()
        .map(|v| EntityRecord::from_value(v).unwrap())
        .collect()
}

fn fixture() -> StaticSource {
    let planets = records(vec![
        json!({
            "url": api("planets/1"), "name": "Tatooine", "population": "200000",
            "terrain": "desert", "climate": "arid", "rotation_period": "23",
            "orbital_period": "304", "diameter": "10465", "gravity": "1 standard",
            "surface_water": "1", "films": [api("films/1")]
        }),
        json!({
            "url": api("planets/2"), "name": "Alderaan", "population": "2000000000",
            "terrain": "grasslands, mountains", "climate": "temperate", "rotation_period": "24",
            "orbital_period": "364", "diameter": "12500", "gravity": "1 standard",
            "surface_water": "40", "films": [api("films/1")]
        }),
    ]);
    let species = records(vec![
        json!({
            "url": api("species/1"), "name": "Human", "classification": "mammal",
            "designation": "sentient", "language": "Galactic Basic", "average_height": "180",
            "average_lifespan": "120", "homeworld": api("planets/2"),
            "films": [api("films/1"), api("films/2")]
        }),
        json!({
            "url": api("species/2"), "name": "Droid", "classification": "artificial",
            "designation": "sentient", "language": "n/a", "average_height": "n/a",
            "average_lifespan": "indefinite", "homeworld": null, "films": [api("films/1")]
        }),
    ]);
    let people = records(vec![
        json!({
            "url": api("people/1"), "name": "Luke Skywalker", "height": "172", "mass": "77",
            "hair_color": "blond", "skin_color": "fair", "eye_color": "blue",
            "birth_year": "19BBY", "gender": "male", "homeworld": api("planets/1"),
            "films": [api("films/1"), api("films/2")], "species": [api("species/1")]
        }),
        json!({
            "url": api("people/2"), "name": "R2-D2", "height": "96", "mass": "32",
            "hair_color": "n/a", "skin_color": "white, blue", "eye_color": "red",
            "birth_year": "33BBY", "gender": "n/a", "homeworld": "unknown",
            "films": [api("films/1")], "species": [api("species/2")]
        }),
        json!({
            "url": api("people/3"), "name": "Leia Organa", "height": "150", "mass": "49",
            "hair_color": "brown", "skin_color": "light", "eye_color": "brown",
            "birth_year": "19BBY", "gender": "female", "homeworld": api("planets/2"),
            "films": [api("films/2"), api("films/1")], "species": []
        }),
    ]);
    let films = records(vec![
        json!({
            "url": api("films/1"), "title": "A New Hope", "director": "George Lucas",
            "producer": "Gary Kurtz, Rick McCallum", "release_date": "1977-05-25",
            "opening_crawl": "It is a period of civil war."
        }),
        json!({
            "url": api("films/2"), "title": "The Empire Strikes Back", "director": "Irvin Kershner",
            "producer": "Gary Kurtz, Rick McCallum", "release_date": "1980-05-17",
            "opening_crawl": "It is a dark time for the Rebellion."
        }),
    ]);
    let starships = records(vec![json!({
        "url": api("starships/12"), "name": "X-wing", "starship_class": "Starfighter",
        "model": "T-65 X-wing", "manufacturer": "Incom Corporation", "length": "12.5",
        "MGLT": "100", "consumables": "1 week", "cost_in_credits": "149999", "crew": "1",
        "hyperdrive_rating": "1.0", "passengers": "0",
        "pilots": [api("people/1")], "films": [api("films/1"), api("films/2")]
    })]);
    let vehicles = records(vec![json!({
        "url": api("vehicles/14"), "name": "Snowspeeder", "vehicle_class": "airspeeder",
        "model": "t-47 airspeeder", "manufacturer": "Incom corporation", "length": "4.5",
        "consumables": "none", "cost_in_credits": "unknown", "crew": "2", "passengers": "0",
        "max_atmosphering_speed": "650", "pilots": [api("people/1")], "films": [api("films/2")]
    })]);

    StaticSource::new()
        .with_collection(Resource::Planets.endpoint(BASE), planets)
        .with_collection(Resource::Species.endpoint(BASE), species)
        .with_collection(Resource::People.endpoint(BASE), people)
        .with_collection(Resource::Films.endpoint(BASE), films)
        .with_collection(Resource::Starships.endpoint(BASE), starships)
        .with_collection(Resource::Vehicles.endpoint(BASE), vehicles)
}

fn text(store: &SqliteStore, sql: &str) -> Option<String> {
    store.connection().query_row(sql, [], |row| row.get(0)).unwrap()
}

/// Full store contents with every surrogate key replaced by `<table>#<row>`
fn canonical_dump(store: &SqliteStore) -> Vec<(String, Vec<Vec<String>>)> {
    let plan = LoadPlan::catalog();
    let conn = store.connection();

    let mut labels: HashMap<String, String> = HashMap::new();
    for table in &plan.tables {
        let sql = format!("SELECT id FROM \"{}\" ORDER BY rowid", table.name);
        let mut stmt = conn.prepare(&sql).unwrap();
        let ids: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        for (i, id) in ids.into_iter().enumerate() {
            labels.insert(id, format!("{}#{}", table.name, i));
        }
    }

    plan.table_names()
        .into_iter()
        .map(|table| {
            let sql = format!("SELECT * FROM \"{}\" ORDER BY rowid", table);
            let mut stmt = conn.prepare(&sql).unwrap();
            let width = stmt.column_count();
            let rows: Vec<Vec<String>> = stmt
                .query_map([], |row| {
                    (0..width)
                        .map(|i| -> rusqlite::Result<String> {
                            Ok(match row.get::<_, SqlValue>(i)? {
                                SqlValue::Null => "NULL".to_string(),
                                SqlValue::Text(t) => labels.get(&t).cloned().unwrap_or(t),
                                other => format!("{:?}", other),
                            })
                        })
                        .collect()
                })
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();
            (table.to_string(), rows)
        })
        .collect()
}

#[test]
fn test_full_catalog_import() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let report = Importer::new(BASE).run(&mut store, &fixture()).unwrap();

    assert_eq!(report.rows("planet"), Some(2));
    assert_eq!(report.rows("lifeform"), Some(2));
    assert_eq!(report.rows("person"), Some(3));
    assert_eq!(report.rows("film"), Some(2));
    assert_eq!(report.rows("starship"), Some(1));
    assert_eq!(report.rows("vehicle"), Some(1));
    assert_eq!(report.rows("person_films"), Some(5));
    assert_eq!(report.rows("planet_films"), Some(2));
    assert_eq!(report.rows("starship_films"), Some(2));
    assert_eq!(report.rows("vehicle_films"), Some(1));
    assert_eq!(report.rows("lifeform_films"), Some(3));
    assert_eq!(report.rows("starship_pilots"), Some(1));
    assert_eq!(report.rows("vehicle_pilots"), Some(1));
    assert_eq!(report.rows("person_lifeforms"), Some(2));
    assert_eq!(report.keys_issued, 11);

    let stats = store.stats(&LoadPlan::catalog().table_names()).unwrap();
    assert_eq!(stats.tables.len(), 14);
}

#[test]
fn test_sentinels_stored_as_null() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    Importer::new(BASE).run(&mut store, &fixture()).unwrap();

    assert_eq!(text(&store, "SELECT homeworld FROM person WHERE name = 'R2-D2'"), None);
    assert_eq!(text(&store, "SELECT gender FROM person WHERE name = 'R2-D2'"), None);
    assert_eq!(text(&store, "SELECT language FROM lifeform WHERE name = 'Droid'"), None);
    assert_eq!(text(&store, "SELECT cost_in_credits FROM vehicle"), None);
    assert_eq!(text(&store, "SELECT consumables FROM vehicle"), Some("none".to_string()));
    assert_eq!(text(&store, "SELECT MGLT FROM starship"), Some("100".to_string()));
}

#[test]
fn test_foreign_keys_point_at_surrogate_keys() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    Importer::new(BASE).run(&mut store, &fixture()).unwrap();

    let homeworld = text(
        &store,
        "SELECT planet.name FROM person JOIN planet ON person.homeworld = planet.id \
         WHERE person.name = 'Luke Skywalker'",
    );
    assert_eq!(homeworld, Some("Tatooine".to_string()));

    let species_home = text(
        &store,
        "SELECT planet.name FROM lifeform JOIN planet ON lifeform.homeworld = planet.id \
         WHERE lifeform.name = 'Human'",
    );
    assert_eq!(species_home, Some("Alderaan".to_string()));

    let leaked: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM person WHERE homeworld LIKE 'http%'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(leaked, 0);
}

#[test]
fn test_person_films_follow_list_order() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    Importer::new(BASE).run(&mut store, &fixture()).unwrap();

    let mut stmt = store
        .connection()
        .prepare(
            "SELECT person.name, film.title FROM person_films \
             JOIN person ON person_films.person_id = person.id \
             JOIN film ON person_films.film_id = film.id \
             ORDER BY person_films.rowid",
        )
        .unwrap();
    let pairs: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let expected = [
        ("Luke Skywalker", "A New Hope"),
        ("Luke Skywalker", "The Empire Strikes Back"),
        ("R2-D2", "A New Hope"),
        ("Leia Organa", "The Empire Strikes Back"),
        ("Leia Organa", "A New Hope"),
    ];
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(p, f)| (p.to_string(), f.to_string()))
        .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn test_deleting_source_cascades_to_edges_only() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    Importer::new(BASE).run(&mut store, &fixture()).unwrap();
    let conn = store.connection();

    conn.execute("DELETE FROM starship", []).unwrap();
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM starship_pilots", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);

    // Films are still referenced by edges, so they cannot be deleted
    assert!(conn.execute("DELETE FROM film", []).is_err());
}

#[test]
fn test_reimport_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("holoload.db");

    let mut store = SqliteStore::open(&db).unwrap();
    Importer::new(BASE).run(&mut store, &fixture()).unwrap();
    let first = canonical_dump(&store);
    let first_key = text(&store, "SELECT id FROM planet WHERE name = 'Tatooine'");
    drop(store);

    let mut store = SqliteStore::open(&db).unwrap();
    Importer::new(BASE).run(&mut store, &fixture()).unwrap();
    let second = canonical_dump(&store);
    let second_key = text(&store, "SELECT id FROM planet WHERE name = 'Tatooine'");

    assert_eq!(first, second);
    assert_ne!(first_key, second_key);
}

#[test]
fn test_missing_required_field_aborts_whole_run() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    Importer::new(BASE).run(&mut store, &fixture()).unwrap();
    let before = canonical_dump(&store);

    let broken = fixture().with_collection(
        Resource::Films.endpoint(BASE),
        records(vec![json!({ "url": api("films/1"), "title": "A New Hope" })]),
    );
    let err = Importer::new(BASE).run(&mut store, &broken).unwrap_err();
    assert!(matches!(err, Error::DataIntegrity(_)));

    assert_eq!(canonical_dump(&store), before);
}

#[test]
fn test_cached_source_feeds_importer() {
    let dir = tempfile::tempdir().unwrap();
    let cached = CachedSource::new(fixture(), dir.path().join(".swapicache"));

    let mut store = SqliteStore::open_in_memory().unwrap();
    Importer::new(BASE).run(&mut store, &cached).unwrap();

    for resource in Resource::all() {
        assert!(cached.cache_path(&resource.endpoint(BASE)).is_file());
    }

    // Serve the second run purely from the cache files
    let offline = CachedSource::new(StaticSource::new(), dir.path().join(".swapicache"));
    let mut replay = SqliteStore::open_in_memory().unwrap();
    Importer::new(BASE).run(&mut replay, &offline).unwrap();

    assert_eq!(canonical_dump(&store), canonical_dump(&replay));
}
