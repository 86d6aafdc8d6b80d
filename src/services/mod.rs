pub mod download_service;
pub mod extract_service;
pub mod throttle;

pub use download_service::{DownloadReport, DownloadService};
pub use extract_service::{
    list_source_files, CommandExtractor, ExtractService, ExtractionStatus, Extractor, StatusCounts,
};
pub use throttle::Throttle;
