mod log;
mod store;

pub use log::{GeneratedResult, HistoryFilter, HistoryLog, SortOrder, HISTORY_CAP};
pub use store::{
    persist_with_fallback, HistoryStore, JsonFileHistoryStore, MemoryHistoryStore,
    PersistOutcome, DEGRADED_HISTORY_LEN, HISTORY_SLOT,
};
