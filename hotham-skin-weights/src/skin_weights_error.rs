use thiserror::Error;

/// Everything that can go wrong when building, validating or persisting [`crate::SkinWeights`].
#[derive(Error, Debug)]
pub enum SkinWeightsError {
    /// Two arrays that must be the same length are not.
    #[error("Number of {first} '{first_len}' does not match number of {second} '{second_len}'")]
    SizeMismatch {
        /// Name of the first array in the pair
        first: &'static str,
        /// Length of the first array
        first_len: usize,
        /// Name of the second array in the pair
        second: &'static str,
        /// Length of the second array
        second_len: usize,
    },
    /// An offset or influence index points outside the array it indexes into.
    #[error("{array}[{position}] with value '{value}' is not a valid index in range [0, {max}]")]
    InvalidIndex {
        /// Name of the array holding the bad value
        array: &'static str,
        /// Position of the bad value within `array`
        position: usize,
        /// The bad value itself
        value: i32,
        /// Largest valid value. `-1` when no value is valid.
        max: i64,
    },
    /// A point claims a negative number of influences.
    ///
    /// Counts are checked for sign before they are summed, so a negative count is reported as
    /// `NegativeCount` even when the counts also fail to add up ([`SkinWeightsError::CountMismatch`]).
    #[error("pointInfluenceCounts[{point}] is negative ('{count}')")]
    NegativeCount {
        /// The offending point
        point: usize,
        /// Its count
        count: i32,
    },
    /// The influence counts don't add up to the length of the flattened arrays.
    #[error("Sum of all pointInfluenceCounts '{sum}' does not match size of pointInfluenceIndices '{expected}'")]
    CountMismatch {
        /// Sum of every entry in pointInfluenceCounts
        sum: i64,
        /// Length of pointInfluenceIndices
        expected: usize,
    },
    /// A point's offset isn't the running sum of the counts before it.
    #[error("pointIndexOffsets[{point}] is pointing to index '{offset}', but sum of all pointInfluenceCounts up to this point is '{expected}'")]
    OffsetMismatch {
        /// The offending point
        point: usize,
        /// Offset stored for that point
        offset: i32,
        /// Offset implied by the counts of the points before it
        expected: i64,
    },
    /// The flattened arrays have grown past what an `i32` offset can address.
    #[error("Flattened arrays would hold '{0}' entries, more than an offset can address ('{max}')", max = i32::MAX)]
    TooManyInfluences(usize),
    /// A float can't be saved because it is infinite or NaN.
    #[error("{array}[{position}] is not a finite number and can't be saved")]
    NonFiniteValue {
        /// Name of the array holding the value
        array: &'static str,
        /// Position of the value within `array`. For poses this is the influence index.
        position: usize,
    },
    /// A required argument was never supplied.
    #[error("Missing required argument: {0}")]
    InvalidArgument(&'static str),
    /// A container holds an object of some other type.
    #[error("Expected an object of type '{expected}' but found '{found}'")]
    UnexpectedType {
        /// Type tag we were asked to load
        expected: &'static str,
        /// Type tag stored in the container
        found: String,
    },
    /// A container was written by a newer format version than this crate understands.
    #[error("Format version {found} is not supported, the newest supported version is {supported}")]
    UnsupportedVersion {
        /// Version stored in the container
        found: u32,
        /// Newest version this crate can read
        supported: u32,
    },
    /// A container is missing a named field.
    #[error("Field '{0}' is missing from the container")]
    MissingField(String),
    /// The container could not be encoded or decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Reading or writing the container failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),
}
