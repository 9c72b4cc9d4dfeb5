/// inkdb API demo
///
/// Demonstrates the main table operations:
/// - Insert, search, update and remove
/// - Nested paths and combined predicates
/// - Persistence to a JSON file

use inkdb::core::config::Config;
use inkdb::core::database::Database;
use inkdb::core::operations::increment;
use inkdb::query::builder::field;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("inkdb_demo.json");
    let mut db = Database::open(Config::json(&path))?;
    db.purge_tables()?;

    println!("Step 1: INSERT");
    let users = db.table("users")?;
    users.insert(json!({"name": "Ann", "age": 31, "address": {"city": "Oslo"}}))?;
    users.insert(json!({"name": "Bob", "age": 17, "address": {"city": "Bergen"}}))?;
    users.insert(json!({"name": "Cid", "age": 45, "tags": ["admin"]}))?;
    println!("  {} users", users.len()?);

    println!("Step 2: SEARCH");
    let adults = field("age").ge(18)?;
    for user in users.search(&adults)? {
        println!("  adult: {}", user["name"]);
    }
    let in_oslo = field("address").field("city").eq("Oslo")?;
    println!("  adults in Oslo: {}", users.count(&(adults.clone() & in_oslo))?);

    println!("Step 3: UPDATE");
    let processed = users.update_with(increment("age"), &field("name").eq("Bob")?)?;
    println!("  updated ids: {:?}", processed.ids);
    println!("  adults now: {}", users.count(&adults)?);

    println!("Step 4: REMOVE");
    let removed = users.remove(&field("tags").any(vec![json!("admin")])?)?;
    println!("  removed ids: {:?}, {} left", removed.ids, users.len()?);

    db.close()?;
    println!("Data written to {}", path.display());
    Ok(())
}
