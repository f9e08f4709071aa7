pub mod file_ops;
pub mod layout;
pub mod pairing;
pub mod split;

pub use layout::StructuredLayout;
pub use pairing::{pair_images_and_labels, AssetPair};
pub use split::{split_pairs, DatasetSplit, SplitAssignment, SplitRatios};
