pub mod arxiv_id;
pub mod leaderboard;
pub mod loaders;
pub mod taxonomy;

pub use leaderboard::{GoldRecord, LeaderboardRecord, LeaderboardTable, PaperEntry, SotaLeaderboards};
pub use loaders::{load_leaderboards, load_validation_ids, parse_annotations};
pub use taxonomy::Taxonomy;
