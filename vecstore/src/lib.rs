//! Exact nearest-neighbor search over L2-normalized embeddings.
//!
//! Every vector is divided by its L2 norm before it is stored or searched,
//! so the reported distance is the squared Euclidean distance between unit
//! vectors:
//!
//! ```text
//! d = |a/|a| - b/|b||^2 = 2 - 2*cos(theta)
//!
//! 0.0  <- identical direction
//! 2.0  <- orthogonal
//! 4.0  <- opposite direction
//! ```
//!
//! This differs from the raw embedding distance: two vectors pointing the
//! same way but with different magnitudes are at distance 0.
//!
//! # Usage
//!
//! ```
//! use sightid_vecstore::{DegeneratePolicy, FlatIndex, VecIndex};
//!
//! let refs: Vec<Vec<f32>> = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
//! let idx = FlatIndex::build(&refs, DegeneratePolicy::Fail).unwrap();
//! let hits = idx.search(&[&[0.9, 0.1]], 1).unwrap();
//! assert_eq!(hits[0][0].position, 0);
//! ```

mod error;
mod flat;
mod l2;
mod vecstore;

pub use error::VecError;
pub use flat::FlatIndex;
pub use l2::{l2_norm, normalize, normalized, squared_l2_distance};
pub use vecstore::{DegeneratePolicy, Neighbor, VecIndex};
