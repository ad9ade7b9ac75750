pub mod bar_chart;
pub mod file_prompt;
pub mod five_num_table;
pub mod results_view;
pub mod spearman_heatmap;
pub mod upload_view;

pub use bar_chart::ContributionChart;
pub use file_prompt::FilePrompt;
pub use five_num_table::FiveNumTableWidget;
pub use results_view::ResultsView;
pub use spearman_heatmap::HeatmapWidget;
pub use upload_view::UploadView;
