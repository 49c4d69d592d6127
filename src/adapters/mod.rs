/*!
 * Resource Adapters
 * Thin dual-mode facades over concrete resources
 */

pub mod cache;
pub mod database;
pub mod fs;
pub mod http;

pub use cache::Cache;
pub use database::{AsyncSqlDriver, Database, Row, SqlDriver, SqlValue};
pub use fs::FileOps;
pub use http::{ApiClient, HttpResponse, RequestOptions};
