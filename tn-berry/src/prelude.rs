//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Tensor3};

pub use crate::consts::{Mode, Sign, CROP_SHAPE, RESIZE_SHAPE, SPLIT_BUCKETS};

pub use crate::config::{Manner, RunConfig};

pub use crate::dataset::split::ExpId;
pub use crate::dataset::tn3k::{Sample, Tn3kDataset};
pub use crate::dataset::{self, build_dataset, home_dataset_dir_with, DatasetBundle};

pub use crate::transform::{PairTransform, Pipeline, RasterPair, TensorPair};

pub use crate::loss::{BceDiceLoss, BceLoss, DiceLoss, GlobalCosineLoss};

pub use crate::output::save_img;

pub use crate::{ConfigError, DatasetError};
