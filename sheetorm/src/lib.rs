pub mod config;
pub mod credentials;
pub mod store;
pub mod record;
pub mod validation;
pub mod hooks;
pub mod table;
pub mod error;

pub use config::Config;
pub use credentials::CredentialProvider;
pub use error::{Result, SheetOrmError};
pub use hooks::{HookPoint, Hooks};
pub use record::{Grid, Record};
pub use store::{MemoryStore, RangeStore, ServiceProvider, SheetsClient};
pub use table::Table;
pub use yup_oauth2::ServiceAccountKey;
