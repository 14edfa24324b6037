pub mod catalog;
pub mod db;
pub mod qa_llm;
pub mod tts;

pub use catalog::FileCatalogAdapter;
pub use db::DbAdapter;
pub use qa_llm::{OfflineQaAdapter, OpenAiQaAdapter};
pub use tts::{NullTtsAdapter, OpenAiTtsAdapter};
