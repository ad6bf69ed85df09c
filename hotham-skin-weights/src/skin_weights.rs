use glam::Mat4;

use crate::{SkinWeightsError, SkinWeightsResult};

/// Names the six arrays are known by, in error messages and in saved containers.
pub mod fields {
    /// Name of each influence
    pub const INFLUENCE_NAMES: &str = "influenceNames";
    /// Bind pose of each influence
    pub const INFLUENCE_POSES: &str = "influencePoses";
    /// Start of each point's run in the flattened arrays
    pub const POINT_INDEX_OFFSETS: &str = "pointIndexOffsets";
    /// Length of each point's run in the flattened arrays
    pub const POINT_INFLUENCE_COUNTS: &str = "pointInfluenceCounts";
    /// Flattened influence indices
    pub const POINT_INFLUENCE_INDICES: &str = "pointInfluenceIndices";
    /// Flattened influence weights
    pub const POINT_INFLUENCE_WEIGHTS: &str = "pointInfluenceWeights";
}

/// Per-point skin weights, stored as a compressed ragged array, along with the name and bind pose of every influence.
///
/// Point `i` is affected by `point_influence_counts[i]` influences, found at
/// `point_influence_indices[o..o + count]` (with matching weights in `point_influence_weights`)
/// where `o = point_index_offsets[i]`.
///
/// Nothing here is checked on construction or mutation. Run [`SkinWeights::validate`] before
/// handing the data to anything that walks it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinWeights {
    pub(crate) influence_names: Vec<String>,
    pub(crate) influence_poses: Vec<Mat4>,
    pub(crate) point_index_offsets: Vec<i32>,
    pub(crate) point_influence_counts: Vec<i32>,
    pub(crate) point_influence_indices: Vec<i32>,
    pub(crate) point_influence_weights: Vec<f32>,
}

impl SkinWeights {
    /// Create an empty `SkinWeights`
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a `SkinWeights` by copying all six arrays
    pub fn from_slices(
        influence_names: &[String],
        influence_poses: &[Mat4],
        point_index_offsets: &[i32],
        point_influence_counts: &[i32],
        point_influence_indices: &[i32],
        point_influence_weights: &[f32],
    ) -> Self {
        Self {
            influence_names: influence_names.to_vec(),
            influence_poses: influence_poses.to_vec(),
            point_index_offsets: point_index_offsets.to_vec(),
            point_influence_counts: point_influence_counts.to_vec(),
            point_influence_indices: point_influence_indices.to_vec(),
            point_influence_weights: point_influence_weights.to_vec(),
        }
    }

    pub(crate) fn from_vecs(
        influence_names: Vec<String>,
        influence_poses: Vec<Mat4>,
        point_index_offsets: Vec<i32>,
        point_influence_counts: Vec<i32>,
        point_influence_indices: Vec<i32>,
        point_influence_weights: Vec<f32>,
    ) -> Self {
        Self {
            influence_names,
            influence_poses,
            point_index_offsets,
            point_influence_counts,
            point_influence_indices,
            point_influence_weights,
        }
    }

    /// Get a builder that copies in each array separately
    pub fn builder<'a>() -> SkinWeightsBuilder<'a> {
        SkinWeightsBuilder::new()
    }

    /// Name of each influence
    pub fn influence_names(&self) -> &[String] {
        &self.influence_names
    }

    /// Bind pose of each influence, in the same order as [`SkinWeights::influence_names`]
    pub fn influence_poses(&self) -> &[Mat4] {
        &self.influence_poses
    }

    /// Offset of each point's first influence in the flattened arrays
    pub fn point_index_offsets(&self) -> &[i32] {
        &self.point_index_offsets
    }

    /// Number of influences affecting each point
    pub fn point_influence_counts(&self) -> &[i32] {
        &self.point_influence_counts
    }

    /// Influence index of every (point, influence) pair
    pub fn point_influence_indices(&self) -> &[i32] {
        &self.point_influence_indices
    }

    /// Weight of every (point, influence) pair
    pub fn point_influence_weights(&self) -> &[f32] {
        &self.point_influence_weights
    }

    /// Mutable access to the influence names. Re-validate once you're done.
    pub fn influence_names_mut(&mut self) -> &mut Vec<String> {
        &mut self.influence_names
    }

    /// Mutable access to the bind poses. Re-validate once you're done.
    pub fn influence_poses_mut(&mut self) -> &mut Vec<Mat4> {
        &mut self.influence_poses
    }

    /// Mutable access to the point offsets. Re-validate once you're done.
    pub fn point_index_offsets_mut(&mut self) -> &mut Vec<i32> {
        &mut self.point_index_offsets
    }

    /// Mutable access to the point counts. Re-validate once you're done.
    pub fn point_influence_counts_mut(&mut self) -> &mut Vec<i32> {
        &mut self.point_influence_counts
    }

    /// Mutable access to the flattened influence indices. Re-validate once you're done.
    pub fn point_influence_indices_mut(&mut self) -> &mut Vec<i32> {
        &mut self.point_influence_indices
    }

    /// Mutable access to the flattened weights. Re-validate once you're done.
    pub fn point_influence_weights_mut(&mut self) -> &mut Vec<f32> {
        &mut self.point_influence_weights
    }

    /// Number of influences, taken from the names
    pub fn influence_count(&self) -> usize {
        self.influence_names.len()
    }

    /// Number of points, taken from the offsets
    pub fn point_count(&self) -> usize {
        self.point_index_offsets.len()
    }

    /// Add an influence, returning its index
    pub fn push_influence(&mut self, name: impl Into<String>, pose: Mat4) -> usize {
        self.influence_names.push(name.into());
        self.influence_poses.push(pose);
        self.influence_names.len() - 1
    }

    /// Add a point affected by `influences`, a list of (influence index, weight) pairs.
    ///
    /// The new point's offset is the current length of the flattened arrays, so a table built
    /// only through this method keeps the canonical layout. Returns the new point's index.
    ///
    /// Offsets and counts are stored as `i32`. If the flattened arrays would grow past
    /// `i32::MAX` entries the point is not added and [`SkinWeightsError::TooManyInfluences`]
    /// is returned.
    pub fn push_point<I>(&mut self, influences: I) -> SkinWeightsResult<usize>
    where
        I: IntoIterator<Item = (i32, f32)>,
    {
        let start = self.point_influence_indices.len();
        for (index, weight) in influences {
            self.point_influence_indices.push(index);
            self.point_influence_weights.push(weight);
        }

        let end = match flat_position(self.point_influence_indices.len()) {
            Ok(end) => end,
            Err(e) => {
                self.point_influence_indices.truncate(start);
                self.point_influence_weights.truncate(start);
                return Err(e);
            }
        };
        // start <= end, so this can't fail once end fits
        let offset = flat_position(start)?;

        self.point_index_offsets.push(offset);
        self.point_influence_counts.push(end - offset);
        Ok(self.point_index_offsets.len() - 1)
    }
}

/// Convert a position in the flattened arrays to the `i32` stored in offsets and counts
fn flat_position(position: usize) -> SkinWeightsResult<i32> {
    i32::try_from(position).map_err(|_| SkinWeightsError::TooManyInfluences(position))
}

/// Builder for [`SkinWeights`]. Every array is required and is copied when [`SkinWeightsBuilder::build`] is called.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkinWeightsBuilder<'a> {
    influence_names: Option<&'a [String]>,
    influence_poses: Option<&'a [Mat4]>,
    point_index_offsets: Option<&'a [i32]>,
    point_influence_counts: Option<&'a [i32]>,
    point_influence_indices: Option<&'a [i32]>,
    point_influence_weights: Option<&'a [f32]>,
}

impl<'a> SkinWeightsBuilder<'a> {
    /// Create a `SkinWeightsBuilder`
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the influence names
    pub fn influence_names(&mut self, influence_names: &'a [String]) -> &mut Self {
        self.influence_names = Some(influence_names);
        self
    }

    /// Set the influence bind poses
    pub fn influence_poses(&mut self, influence_poses: &'a [Mat4]) -> &mut Self {
        self.influence_poses = Some(influence_poses);
        self
    }

    /// Set the point offsets
    pub fn point_index_offsets(&mut self, point_index_offsets: &'a [i32]) -> &mut Self {
        self.point_index_offsets = Some(point_index_offsets);
        self
    }

    /// Set the point counts
    pub fn point_influence_counts(&mut self, point_influence_counts: &'a [i32]) -> &mut Self {
        self.point_influence_counts = Some(point_influence_counts);
        self
    }

    /// Set the flattened influence indices
    pub fn point_influence_indices(&mut self, point_influence_indices: &'a [i32]) -> &mut Self {
        self.point_influence_indices = Some(point_influence_indices);
        self
    }

    /// Set the flattened weights
    pub fn point_influence_weights(&mut self, point_influence_weights: &'a [f32]) -> &mut Self {
        self.point_influence_weights = Some(point_influence_weights);
        self
    }

    /// Copy every array into a new `SkinWeights`.
    ///
    /// Fails with [`SkinWeightsError::InvalidArgument`] naming the first array that was never set.
    pub fn build(&self) -> SkinWeightsResult<SkinWeights> {
        Ok(SkinWeights::from_slices(
            required(self.influence_names, fields::INFLUENCE_NAMES)?,
            required(self.influence_poses, fields::INFLUENCE_POSES)?,
            required(self.point_index_offsets, fields::POINT_INDEX_OFFSETS)?,
            required(self.point_influence_counts, fields::POINT_INFLUENCE_COUNTS)?,
            required(self.point_influence_indices, fields::POINT_INFLUENCE_INDICES)?,
            required(self.point_influence_weights, fields::POINT_INFLUENCE_WEIGHTS)?,
        ))
    }
}

fn required<'a, T>(array: Option<&'a [T]>, name: &'static str) -> SkinWeightsResult<&'a [T]> {
    array.ok_or(SkinWeightsError::InvalidArgument(name))
}
