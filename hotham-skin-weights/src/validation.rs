use std::ops::Deref;

use glam::Mat4;
use log::{debug, trace};

use crate::{skin_weights::fields, SkinWeights, SkinWeightsError, SkinWeightsResult};

/// Builder for [`Validator`].
#[derive(Debug, Default, Clone)]
pub struct ValidatorBuilder {
    strict_offset_bounds: bool,
}

impl ValidatorBuilder {
    /// Create a `ValidatorBuilder`
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject every offset outside `[0, M-1]`, where `M` is the length of the flattened arrays.
    ///
    /// By default offsets may also equal `M`, which is where the prefix sum puts any
    /// zero-influence points at the end of the table. An offset of `M` on a point that does have
    /// influences is still caught, by the count and offset checks.
    pub fn strict_offset_bounds(&mut self, strict: bool) -> &mut Self {
        self.strict_offset_bounds = strict;
        self
    }

    /// Build the `Validator`
    pub fn build(&self) -> Validator {
        Validator {
            strict_offset_bounds: self.strict_offset_bounds,
        }
    }
}

/// Checks that a [`SkinWeights`] is internally consistent.
///
/// The checks always run in the same order - sizes, ids, counts, offsets - and the first one to
/// fail is reported. Later checks rely on the earlier ones having passed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    strict_offset_bounds: bool,
}

impl Validator {
    /// Create a `Validator` with the default configuration
    pub fn new() -> Self {
        Default::default()
    }

    /// Get a builder to configure a `Validator`
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// Run every check, in order, returning the first failure
    pub fn validate(&self, skin_weights: &SkinWeights) -> SkinWeightsResult<()> {
        let result = self
            .check_sizes(skin_weights)
            .and_then(|_| self.check_ids(skin_weights))
            .and_then(|_| self.check_counts(skin_weights))
            .and_then(|_| self.check_offsets(skin_weights));

        match &result {
            Ok(_) => debug!(
                "Skin weights are valid: {} influences, {} points, {} weights",
                skin_weights.influence_count(),
                skin_weights.point_count(),
                skin_weights.point_influence_indices().len()
            ),
            Err(e) => debug!("Skin weights are invalid: {e}"),
        }

        result
    }

    /// Validate `skin_weights`, returning a view that is known to be safe to walk
    pub fn validated<'a>(
        &self,
        skin_weights: &'a SkinWeights,
    ) -> SkinWeightsResult<ValidatedSkinWeights<'a>> {
        self.validate(skin_weights)?;
        Ok(ValidatedSkinWeights { skin_weights })
    }

    /// Check that each pair of parallel arrays has matching lengths
    pub fn check_sizes(&self, skin_weights: &SkinWeights) -> SkinWeightsResult<()> {
        trace!("check_sizes");
        check_size_pair(
            fields::INFLUENCE_NAMES,
            skin_weights.influence_names().len(),
            fields::INFLUENCE_POSES,
            skin_weights.influence_poses().len(),
        )?;
        check_size_pair(
            fields::POINT_INDEX_OFFSETS,
            skin_weights.point_index_offsets().len(),
            fields::POINT_INFLUENCE_COUNTS,
            skin_weights.point_influence_counts().len(),
        )?;
        check_size_pair(
            fields::POINT_INFLUENCE_INDICES,
            skin_weights.point_influence_indices().len(),
            fields::POINT_INFLUENCE_WEIGHTS,
            skin_weights.point_influence_weights().len(),
        )
    }

    /// Check that every offset points into the flattened arrays and every influence index points at an influence
    pub fn check_ids(&self, skin_weights: &SkinWeights) -> SkinWeightsResult<()> {
        trace!("check_ids");
        let weight_count = skin_weights.point_influence_indices().len() as i64;
        let influence_count = skin_weights.influence_count() as i64;

        // Points with no influences at the end of the table sit one past the last weight.
        let max = if self.strict_offset_bounds {
            weight_count - 1
        } else {
            weight_count
        };
        for (position, &offset) in skin_weights.point_index_offsets().iter().enumerate() {
            if offset < 0 || offset as i64 > max {
                return Err(SkinWeightsError::InvalidIndex {
                    array: fields::POINT_INDEX_OFFSETS,
                    position,
                    value: offset,
                    max,
                });
            }
        }

        let max = influence_count - 1;
        for (position, &index) in skin_weights.point_influence_indices().iter().enumerate() {
            if index < 0 || index as i64 > max {
                return Err(SkinWeightsError::InvalidIndex {
                    array: fields::POINT_INFLUENCE_INDICES,
                    position,
                    value: index,
                    max,
                });
            }
        }

        Ok(())
    }

    /// Check that the influence counts add up to the length of the flattened arrays.
    ///
    /// Every count must be non-negative. A negative count is reported as
    /// [`SkinWeightsError::NegativeCount`] before the sum is compared.
    pub fn check_counts(&self, skin_weights: &SkinWeights) -> SkinWeightsResult<()> {
        trace!("check_counts");
        let mut sum = 0i64;
        for (point, &count) in skin_weights.point_influence_counts().iter().enumerate() {
            if count < 0 {
                return Err(SkinWeightsError::NegativeCount { point, count });
            }
            sum += count as i64;
        }

        let expected = skin_weights.point_influence_indices().len();
        if sum != expected as i64 {
            return Err(SkinWeightsError::CountMismatch { sum, expected });
        }

        Ok(())
    }

    /// Check that each point's offset is the sum of the counts of every point before it
    pub fn check_offsets(&self, skin_weights: &SkinWeights) -> SkinWeightsResult<()> {
        trace!("check_offsets");
        let mut expected = 0i64;
        for (point, (&offset, &count)) in skin_weights
            .point_index_offsets()
            .iter()
            .zip(skin_weights.point_influence_counts())
            .enumerate()
        {
            if offset as i64 != expected {
                return Err(SkinWeightsError::OffsetMismatch {
                    point,
                    offset,
                    expected,
                });
            }
            expected += count as i64;
        }

        Ok(())
    }
}

fn check_size_pair(
    first: &'static str,
    first_len: usize,
    second: &'static str,
    second_len: usize,
) -> SkinWeightsResult<()> {
    if first_len != second_len {
        return Err(SkinWeightsError::SizeMismatch {
            first,
            first_len,
            second,
            second_len,
        });
    }
    Ok(())
}

impl SkinWeights {
    /// Run every check with the default [`Validator`], returning the first failure
    pub fn validate(&self) -> SkinWeightsResult<()> {
        Validator::default().validate(self)
    }

    /// Validate with the default [`Validator`], returning a view that is known to be safe to walk
    pub fn validated(&self) -> SkinWeightsResult<ValidatedSkinWeights<'_>> {
        Validator::default().validated(self)
    }
}

/// A [`SkinWeights`] that has passed validation.
///
/// Holds a shared borrow, so the table can't be mutated for as long as this is alive. Getting one
/// back after a mutation means validating again.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedSkinWeights<'a> {
    skin_weights: &'a SkinWeights,
}

impl<'a> ValidatedSkinWeights<'a> {
    /// The (influence index, weight) pairs affecting `point`, or `None` if there is no such point
    pub fn point_influences(
        &self,
        point: usize,
    ) -> Option<impl Iterator<Item = (usize, f32)> + 'a> {
        let skin_weights = self.skin_weights;
        let start = *skin_weights.point_index_offsets().get(point)? as usize;
        let end = start + skin_weights.point_influence_counts()[point] as usize;

        let indices = &skin_weights.point_influence_indices()[start..end];
        let weights = &skin_weights.point_influence_weights()[start..end];
        Some(
            indices
                .iter()
                .zip(weights)
                .map(|(&index, &weight)| (index as usize, weight)),
        )
    }

    /// Walk every point in order
    pub fn points(&self) -> impl Iterator<Item = impl Iterator<Item = (usize, f32)> + 'a> + 'a {
        let validated = *self;
        (0..self.skin_weights.point_count())
            .filter_map(move |point| validated.point_influences(point))
    }

    /// Name and bind pose of an influence
    pub fn influence(&self, index: usize) -> Option<(&'a str, &'a Mat4)> {
        let skin_weights = self.skin_weights;
        let name = skin_weights.influence_names().get(index)?;
        let pose = skin_weights.influence_poses().get(index)?;
        Some((name.as_str(), pose))
    }

    /// Give up the proof and get the underlying table back
    pub fn into_inner(self) -> &'a SkinWeights {
        self.skin_weights
    }
}

impl Deref for ValidatedSkinWeights<'_> {
    type Target = SkinWeights;

    fn deref(&self) -> &Self::Target {
        self.skin_weights
    }
}
