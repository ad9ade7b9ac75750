pub mod analysis_controller;
pub mod api_client;
pub mod result_store;
pub mod results_page;
pub mod session_storage;
pub mod target_selector;
pub mod tasks;
pub mod upload_controller;
pub mod upload_page;

pub use analysis_controller::AnalysisController;
pub use api_client::{AnalysisClient, AnalysisService, ApiError};
pub use result_store::{LAST_RESULT_KEY, ResolvedResult, ResultSource, ResultStore};
pub use results_page::ResultsPage;
pub use session_storage::{
    FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError, prune_stale_sessions,
};
pub use target_selector::TargetSelector;
pub use tasks::{
    AnalyzeOutcome, AnalyzeRequest, ProbeOutcome, ProbeRequest, ServiceEvent, spawn_analyze,
    spawn_health, spawn_probe,
};
pub use upload_controller::UploadController;
pub use upload_page::{PrimaryAction, UploadPage};
