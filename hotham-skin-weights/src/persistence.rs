use std::io::{Read, Write};

use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{skin_weights::fields, SkinWeights, SkinWeightsError, SkinWeightsResult};

/// Type tag [`SkinWeights`] are saved under
pub const TYPE_NAME: &str = "SkinWeights";

/// Newest format version this crate writes and can read
pub const IO_VERSION: u32 = 0;

/// Versioned storage for the named fields of a single object.
pub trait ObjectContainer {
    /// Record the type and format version of the object being saved
    fn write_header(&mut self, type_name: &str, version: u32);

    /// Type tag of the stored object
    fn type_name(&self) -> &str;

    /// Format version of the stored object
    fn version(&self) -> u32;

    /// Store `value` under `name`, replacing anything already there
    fn write_field<T: Serialize + ?Sized>(&mut self, name: &str, value: &T)
        -> SkinWeightsResult<()>;

    /// Read back the value stored under `name`
    fn read_field<T: DeserializeOwned>(&self, name: &str) -> SkinWeightsResult<T>;
}

/// An [`ObjectContainer`] backed by a JSON object.
///
/// On disk it looks like `{ "typeName": "SkinWeights", "version": 0, "fields": { ... } }`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonContainer {
    type_name: String,
    version: u32,
    fields: Map<String, Value>,
}

impl JsonContainer {
    /// Create an empty `JsonContainer`
    pub fn new() -> Self {
        Default::default()
    }

    /// Read a container from JSON
    pub fn read_from<R: Read>(reader: R) -> SkinWeightsResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the container as JSON
    pub fn write_to<W: Write>(&self, writer: W) -> SkinWeightsResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Names of every stored field
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl ObjectContainer for JsonContainer {
    fn write_header(&mut self, type_name: &str, version: u32) {
        self.type_name = type_name.to_string();
        self.version = version;
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn write_field<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
    ) -> SkinWeightsResult<()> {
        self.fields
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    fn read_field<T: DeserializeOwned>(&self, name: &str) -> SkinWeightsResult<T> {
        let value = self
            .fields
            .get(name)
            .ok_or_else(|| SkinWeightsError::MissingField(name.to_string()))?;
        Ok(T::deserialize(value)?)
    }
}

impl SkinWeights {
    /// Save all six arrays into `container`. The layout is not validated.
    ///
    /// Weights and pose elements must be finite, since they could not be read back otherwise.
    /// An infinite or NaN value fails with [`SkinWeightsError::NonFiniteValue`] before anything
    /// is written to `container`.
    pub fn save<C: ObjectContainer>(&self, container: &mut C) -> SkinWeightsResult<()> {
        if let Some(position) = self.influence_poses().iter().position(|p| !p.is_finite()) {
            return Err(SkinWeightsError::NonFiniteValue {
                array: fields::INFLUENCE_POSES,
                position,
            });
        }
        if let Some(position) = self
            .point_influence_weights()
            .iter()
            .position(|w| !w.is_finite())
        {
            return Err(SkinWeightsError::NonFiniteValue {
                array: fields::POINT_INFLUENCE_WEIGHTS,
                position,
            });
        }

        debug!(
            "Saving skin weights: {} influences, {} points",
            self.influence_count(),
            self.point_count()
        );
        container.write_header(TYPE_NAME, IO_VERSION);
        container.write_field(fields::INFLUENCE_NAMES, self.influence_names())?;
        container.write_field(fields::INFLUENCE_POSES, self.influence_poses())?;
        container.write_field(fields::POINT_INDEX_OFFSETS, self.point_index_offsets())?;
        container.write_field(fields::POINT_INFLUENCE_COUNTS, self.point_influence_counts())?;
        container.write_field(fields::POINT_INFLUENCE_INDICES, self.point_influence_indices())?;
        container.write_field(fields::POINT_INFLUENCE_WEIGHTS, self.point_influence_weights())?;
        Ok(())
    }

    /// Load a `SkinWeights` previously written by [`SkinWeights::save`]. Nothing is validated.
    pub fn load<C: ObjectContainer>(container: &C) -> SkinWeightsResult<Self> {
        if container.type_name() != TYPE_NAME {
            return Err(SkinWeightsError::UnexpectedType {
                expected: TYPE_NAME,
                found: container.type_name().to_string(),
            });
        }

        let version = container.version();
        if version > IO_VERSION {
            return Err(SkinWeightsError::UnsupportedVersion {
                found: version,
                supported: IO_VERSION,
            });
        }

        let skin_weights = SkinWeights::from_vecs(
            container.read_field(fields::INFLUENCE_NAMES)?,
            container.read_field(fields::INFLUENCE_POSES)?,
            container.read_field(fields::POINT_INDEX_OFFSETS)?,
            container.read_field(fields::POINT_INFLUENCE_COUNTS)?,
            container.read_field(fields::POINT_INFLUENCE_INDICES)?,
            container.read_field(fields::POINT_INFLUENCE_WEIGHTS)?,
        );
        debug!(
            "Loaded skin weights (version {version}): {} influences, {} points",
            skin_weights.influence_count(),
            skin_weights.point_count()
        );

        Ok(skin_weights)
    }

    /// Save to `writer` as a [`JsonContainer`]
    pub fn to_writer<W: Write>(&self, writer: W) -> SkinWeightsResult<()> {
        let mut container = JsonContainer::new();
        self.save(&mut container)?;
        container.write_to(writer)
    }

    /// Load from a [`JsonContainer`] read from `reader`
    pub fn from_reader<R: Read>(reader: R) -> SkinWeightsResult<Self> {
        SkinWeights::load(&JsonContainer::read_from(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Mat4, Quat, Vec3};

    fn arm() -> SkinWeights {
        let mut skin_weights = SkinWeights::new();
        let shoulder = skin_weights.push_influence("shoulder", Mat4::IDENTITY) as i32;
        let elbow = skin_weights.push_influence(
            "elbow",
            Mat4::from_rotation_translation(
                Quat::from_rotation_z(0.3),
                Vec3::new(0.0, -0.31, 0.02),
            )
            .inverse(),
        ) as i32;
        skin_weights.push_point([(shoulder, 1.0)]).unwrap();
        skin_weights.push_point([(shoulder, 0.33), (elbow, 0.67)]).unwrap();
        skin_weights.push_point([(elbow, 1.0)]).unwrap();
        skin_weights
    }

    #[test]
    pub fn test_save_load() {
        let skin_weights = arm();
        let mut container = JsonContainer::new();
        skin_weights.save(&mut container).unwrap();

        assert_eq!(container.type_name(), TYPE_NAME);
        assert_eq!(container.version(), IO_VERSION);
        let mut names: Vec<_> = container.field_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "influenceNames",
                "influencePoses",
                "pointIndexOffsets",
                "pointInfluenceCounts",
                "pointInfluenceIndices",
                "pointInfluenceWeights",
            ]
        );

        let loaded = SkinWeights::load(&container).unwrap();
        assert_eq!(loaded, skin_weights);
        assert_relative_eq!(loaded.influence_poses()[1], skin_weights.influence_poses()[1]);
    }

    #[test]
    pub fn test_writer_reader() {
        let skin_weights = arm();
        let mut bytes = Vec::new();
        skin_weights.to_writer(&mut bytes).unwrap();

        let loaded = SkinWeights::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(loaded, skin_weights);
        loaded.validate().unwrap();
    }

    #[test]
    pub fn test_load_does_not_validate() {
        let mut skin_weights = arm();
        skin_weights.point_index_offsets_mut()[2] = 42;
        assert!(skin_weights.validate().is_err());

        let mut container = JsonContainer::new();
        skin_weights.save(&mut container).unwrap();
        let loaded = SkinWeights::load(&container).unwrap();
        assert_eq!(loaded, skin_weights);
    }

    #[test]
    pub fn test_wrong_type() {
        let mut container = JsonContainer::new();
        arm().save(&mut container).unwrap();
        container.write_header("Mesh", IO_VERSION);

        match SkinWeights::load(&container).unwrap_err() {
            SkinWeightsError::UnexpectedType { expected, found } => {
                assert_eq!(expected, TYPE_NAME);
                assert_eq!(found, "Mesh");
            }
            e => panic!("Unexpected error: {e:?}"),
        }
    }

    #[test]
    pub fn test_newer_version() {
        let mut container = JsonContainer::new();
        arm().save(&mut container).unwrap();
        container.write_header(TYPE_NAME, IO_VERSION + 1);

        assert!(matches!(
            SkinWeights::load(&container),
            Err(SkinWeightsError::UnsupportedVersion {
                found: 1,
                supported: 0
            })
        ));
    }

    #[test]
    pub fn test_missing_field() {
        let json = r#"{
            "typeName": "SkinWeights",
            "version": 0,
            "fields": {
                "influenceNames": ["a"],
                "influencePoses": [[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]],
                "pointIndexOffsets": [0],
                "pointInfluenceCounts": [1],
                "pointInfluenceIndices": [0]
            }
        }"#;

        match SkinWeights::from_reader(json.as_bytes()).unwrap_err() {
            SkinWeightsError::MissingField(name) => assert_eq!(name, "pointInfluenceWeights"),
            e => panic!("Unexpected error: {e:?}"),
        }
    }

    #[test]
    pub fn test_malformed_field() {
        let mut container = JsonContainer::new();
        arm().save(&mut container).unwrap();
        container
            .write_field(fields::POINT_INFLUENCE_COUNTS, "lots")
            .unwrap();

        assert!(matches!(
            SkinWeights::load(&container),
            Err(SkinWeightsError::Json(_))
        ));
        assert!(matches!(
            SkinWeights::from_reader("not json".as_bytes()),
            Err(SkinWeightsError::Json(_))
        ));
    }

    #[test]
    pub fn test_non_finite_values_are_not_saved() {
        let mut skin_weights = arm();
        skin_weights.point_influence_weights_mut()[2] = f32::INFINITY;
        skin_weights.validate().unwrap();

        let mut container = JsonContainer::new();
        match skin_weights.save(&mut container).unwrap_err() {
            SkinWeightsError::NonFiniteValue { array, position } => {
                assert_eq!(array, fields::POINT_INFLUENCE_WEIGHTS);
                assert_eq!(position, 2);
            }
            e => panic!("Unexpected error: {e:?}"),
        }
        assert_eq!(container, JsonContainer::new());

        let mut skin_weights = arm();
        skin_weights.influence_poses_mut()[1].w_axis.x = f32::NAN;
        let mut bytes = Vec::new();
        assert!(matches!(
            skin_weights.to_writer(&mut bytes),
            Err(SkinWeightsError::NonFiniteValue {
                array: fields::INFLUENCE_POSES,
                position: 1
            })
        ));
        assert!(bytes.is_empty());
    }

    #[test]
    pub fn test_extreme_finite_values_round_trip() {
        let mut skin_weights = arm();
        skin_weights.point_influence_weights_mut()[0] = f32::MAX;
        skin_weights.point_influence_weights_mut()[2] = -0.0;
        skin_weights.influence_poses_mut()[0].x_axis.x = f32::MIN;

        let mut bytes = Vec::new();
        skin_weights.to_writer(&mut bytes).unwrap();
        let loaded = SkinWeights::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(loaded, skin_weights);
    }
}
