use inkdb::core::config::Config;
use inkdb::core::database::Database;
use inkdb::core::operations::{delete, increment};
use inkdb::core::types::RecordId;
use inkdb::query::builder::{field, Query};
use serde_json::json;
use tempfile::tempdir;

fn seeded(db: &mut Database) {
    let people = db.table("people").expect("table");
    people.insert(json!({"name": "a", "age": 3})).expect("insert a");
    people.insert(json!({"name": "b", "age": 7})).expect("insert b");
}

#[test]
fn search_and_count_over_fresh_table() {
    let mut db = Database::open(Config::in_memory()).expect("open");
    seeded(&mut db);
    let people = db.table("people").expect("table");

    let older = field("age").gt(5).expect("predicate");
    let found = people.search(&older).expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], json!(2));
    assert_eq!(people.count(&older).expect("count"), 1);
}

#[test]
fn update_by_identity_keeps_other_fields() {
    let mut db = Database::open(Config::in_memory()).expect("open");
    seeded(&mut db);
    let people = db.table("people").expect("table");

    people.update_ids(json!({"age": 8}), &[RecordId(2)]).expect("update");
    let record = people.get_by_id(RecordId(2)).expect("get").expect("present");
    assert_eq!(record["age"], json!(8));
    assert_eq!(record["name"], json!("b"));
    assert_eq!(people.len().expect("len"), 2);
}

#[test]
fn remove_then_purge_resets_identity() {
    let mut db = Database::open(Config::in_memory()).expect("open");
    seeded(&mut db);
    let people = db.table("people").expect("table");

    people.remove_ids(&[RecordId(1)]).expect("remove");
    people.purge().expect("purge");
    assert_eq!(people.len().expect("len"), 0);
    let record = people.insert(json!({"name": "c"})).expect("insert");
    assert_eq!(record["id"], json!(1));
}

#[test]
fn identities_run_one_to_n() {
    let mut db = Database::open(Config::in_memory()).expect("open");
    let t = db.table("t").expect("table");
    let inserted = t
        .insert_multiple((0..20).map(|i| json!({"i": i})).collect())
        .expect("insert_multiple");
    let ids: Vec<u64> = inserted.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
}

#[test]
fn cache_never_serves_stale_results() {
    let mut db = Database::open(Config::in_memory()).expect("open");
    seeded(&mut db);
    let people = db.table("people").expect("table");
    let named_b = field("name").eq("b").expect("predicate");

    assert_eq!(people.search(&named_b).expect("search").len(), 1);
    people.update_with(increment("age"), &named_b).expect("increment");
    assert_eq!(people.search(&named_b).expect("search")[0]["age"], json!(8));

    people.update_with(delete("name"), &named_b).expect("delete field");
    assert!(people.search(&named_b).expect("search").is_empty());
}

#[test]
fn equivalent_predicates_share_cache_entry() {
    let mut db = Database::open(Config::in_memory()).expect("open");
    seeded(&mut db);
    let people = db.table("people").expect("table");

    let a = field("age").gt(1).expect("predicate");
    let b = field("name").exists().expect("predicate");
    people.search(&(a.clone() & b.clone())).expect("search");
    people.count(&(b & a)).expect("count");

    let stats = people.cache_stats();
    assert_eq!(stats.hit_count, 1);
    assert_eq!(stats.size, 1);
}

#[test]
fn nested_paths_and_any() {
    let mut db = Database::open(Config::in_memory()).expect("open");
    let posts = db.table("posts").expect("table");
    posts
        .insert_multiple(vec![
            json!({"title": "intro", "author": {"name": "ann"}, "tags": ["rust", "db"]}),
            json!({"title": "deep dive", "author": {"name": "bob"}, "tags": ["db"]}),
            json!({"title": "misc", "comments": [{"by": "ann"}]}),
        ])
        .expect("insert");

    let by_ann = field("author").field("name").eq("ann").expect("predicate");
    assert_eq!(posts.count(&by_ann).expect("count"), 1);

    let rust = field("tags").any(vec![json!("rust")]).expect("predicate");
    assert_eq!(posts.count(&rust).expect("count"), 1);

    let commented_by_ann = field("comments")
        .any(Query::new().field("by").eq("ann").expect("inner"))
        .expect("predicate");
    let found = posts.get(&commented_by_ann).expect("get").expect("present");
    assert_eq!(found["title"], json!("misc"));

    let first_comment = field("comments").index(0).field("by").exists().expect("predicate");
    assert!(posts.contains(&first_comment).expect("contains"));
}

#[test]
fn records_survive_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("db.json");

    {
        let mut db = Database::open(Config::json(&path)).expect("open");
        seeded(&mut db);
        db.table("people").expect("table").remove_ids(&[RecordId(2)]).expect("remove");
        db.close().expect("close");
    }

    let mut db = Database::open(Config::json(&path)).expect("reopen");
    assert!(db.tables().expect("tables").contains("people"));
    let people = db.table("people").expect("table");
    assert_eq!(people.len().expect("len"), 1);
    let record = people.insert(json!({"name": "c"})).expect("insert");
    assert_eq!(record["id"], json!(2));
}

#[test]
fn write_cache_defers_disk_writes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("db.json");

    let mut db = Database::open(Config::json(&path).with_write_cache(100)).expect("open");
    seeded(&mut db);
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "");

    db.close().expect("close");
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(on_disk["people"].as_array().map(Vec::len), Some(2));
}
