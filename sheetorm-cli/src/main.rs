use clap::{Parser, Subcommand, ValueEnum};
use sheetorm::{CredentialProvider, Record, Table};
use std::path::PathBuf;
use std::process;

/// sheetorm CLI — read and write a Google Sheets tab as a table of records
#[derive(Parser)]
#[command(name = "sheetorm", version, about)]
struct Cli {
    /// Spreadsheet ID (the long token in the sheet's URL)
    #[arg(long, env = "SPREADSHEET_ID")]
    spreadsheet_id: String,

    /// Sheet (tab) name to use as the table
    #[arg(long, env = "SHEET_NAME")]
    sheet: String,

    /// Path to the service account key file
    #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT")]
    key_file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List records, optionally filtered and paginated
    FindAll {
        /// Exact-match filters (e.g. --filter name=Alice)
        #[arg(long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,
        /// Maximum number of records to return
        #[arg(long)]
        limit: Option<usize>,
        /// Number of matching records to skip
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Get the first record whose column equals a value
    FindOne {
        /// Column name
        column: String,
        /// Value to match
        value: String,
    },

    /// Append a new record (id, name and age are required)
    Insert {
        /// Field values (e.g. --field name="Alice Chen")
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Update the first record whose column equals a value
    Update {
        /// Column name
        column: String,
        /// Value to match
        value: String,
        /// Field values to update (e.g. --field age=26)
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Delete every record whose column equals a value
    Delete {
        /// Column name
        column: String,
        /// Value to match
        value: String,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("Invalid key=value pair: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ERROR:{e}");
            process::exit(1);
        }
    }
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let provider = CredentialProvider::new(cli.key_file);
    let table: Table<Record> = Table::new(provider, cli.spreadsheet_id, cli.sheet);
    log::debug!(
        "Using sheet '{}' of spreadsheet {}",
        table.sheet_name(),
        table.spreadsheet_id()
    );

    match cli.command {
        Command::FindAll {
            filters,
            limit,
            offset,
        } => {
            let filter = (!filters.is_empty()).then(|| string_fields(&filters));
            let records = table.find_all(filter.as_ref(), limit, offset).await?;
            print_output(&serde_json::to_value(records)?, &cli.format)?;
        }

        Command::FindOne { column, value } => {
            let record = table.find_one(&column, &value).await?;
            print_output(&serde_json::to_value(record)?, &cli.format)?;
        }

        Command::Insert { fields } => {
            let data = typed_fields(&fields);
            table.insert(&data).await?;
            print_output(&serde_json::json!({ "ok": true, "inserted": data }), &cli.format)?;
        }

        Command::Update {
            column,
            value,
            fields,
        } => {
            let patch = typed_fields(&fields);
            let updated = table.update(&column, &value, &patch).await?;
            print_output(&serde_json::json!({ "ok": true, "updated": updated }), &cli.format)?;
        }

        Command::Delete { column, value } => {
            let deleted = table.delete(&column, &value).await?;
            print_output(&serde_json::json!({ "ok": true, "deleted": deleted }), &cli.format)?;
        }
    }

    Ok(())
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// Filters compare against cell text, so values stay strings.
fn string_fields(fields: &[(String, String)]) -> Record {
    fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

/// Written values are parsed as JSON when possible (numbers, booleans),
/// falling back to plain strings.
fn typed_fields(fields: &[(String, String)]) -> Record {
    fields
        .iter()
        .map(|(key, val)| {
            let json_val =
                serde_json::from_str(val).unwrap_or_else(|_| serde_json::Value::String(val.clone()));
            (key.as_str(), json_val)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("name=Alice Chen").unwrap(),
            ("name".to_string(), "Alice Chen".to_string())
        );
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_typed_fields_parse_json_scalars() {
        let fields = vec![
            ("id".to_string(), "1".to_string()),
            ("name".to_string(), "Alice".to_string()),
            ("age".to_string(), "25".to_string()),
        ];
        let record = typed_fields(&fields);

        assert_eq!(record.get("name"), Some(&json!("Alice")));
        assert_eq!(record.get("age"), Some(&json!(25)));
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, vec!["id", "name", "age"]);
    }

    #[test]
    fn test_string_fields_keep_text() {
        let fields = vec![("age".to_string(), "25".to_string())];
        assert_eq!(string_fields(&fields).get("age"), Some(&json!("25")));
    }

    #[test]
    fn test_cli_parses_find_all() {
        let cli = Cli::try_parse_from([
            "sheetorm",
            "--spreadsheet-id",
            "abc",
            "--sheet",
            "Users",
            "find-all",
            "--filter",
            "name=Alice",
            "--limit",
            "10",
        ])
        .unwrap();

        match cli.command {
            Command::FindAll { filters, limit, offset } => {
                assert_eq!(filters, vec![("name".to_string(), "Alice".to_string())]);
                assert_eq!(limit, Some(10));
                assert_eq!(offset, None);
            }
            _ => panic!("Expected find-all"),
        }
    }
}
