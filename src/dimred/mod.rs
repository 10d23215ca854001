//! # Dimensionality Reduction
//!
//! Algorithms that project high-dimensional data into a few dimensions.
//!
//! - **PCA** ([`pca`]): linear projection onto the leading principal axes;
//!   the fitted basis can be reused on new observations.
//! - **MDS** ([`mds`]): embeddings that follow a dissimilarity matrix, by
//!   classical scaling, Sammon mapping or the HiT heuristic. An MDS embedding
//!   is tied to the objects it was computed for.

pub mod mds;
pub mod pca;
