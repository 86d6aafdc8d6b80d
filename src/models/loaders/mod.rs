pub mod annotation_loader;

pub use annotation_loader::{
    list_subdir_names, load_annotation_file, load_leaderboards, load_validation_ids,
    parse_annotations,
};
