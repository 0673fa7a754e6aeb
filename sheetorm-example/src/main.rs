use serde::{Deserialize, Serialize};
use serde_json::json;
use sheetorm::{Config, Record, Table};
use std::process;

/// Shape of a row in the users sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub age: u32,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("Starting sheetorm example");

    if let Err(e) = run().await {
        log::error!("{e}");
        process::exit(1);
    }
}

async fn run() -> sheetorm::Result<()> {
    let config = Config::from_env();
    let mut users: Table<User> = Table::from_config(&config)?;
    log::info!(
        "Using sheet '{}' of spreadsheet {}",
        users.sheet_name(),
        users.spreadsheet_id()
    );

    users
        .on_before_insert(|data: Record| async move {
            log::info!("About to insert: {}", json!(data));
            Ok(())
        })
        .on_after_update(|data: Record| async move {
            log::info!("Updated fields: {}", json!(data));
            Ok(())
        });

    users
        .insert(&User {
            id: "1".into(),
            name: "Alice".into(),
            age: 25,
        })
        .await?;

    let found = users.find_one("id", "1").await?;
    println!("Found user: {found:?}");

    users
        .update("id", "1", &json!({ "name": "Alice Updated", "age": 26 }))
        .await?;

    let filter: Record = [("name", "Alice Updated")].into_iter().collect();
    let page = users.find_all(Some(&filter), Some(10), Some(0)).await?;
    println!("Users with pagination: {page:?}");

    users.delete("id", "1").await?;
    log::info!("Example finished");
    Ok(())
}
