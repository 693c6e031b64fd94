//! Configuration file parser for fan-beam projections

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};

use units::{Angle, Length, turn};

use crate::error::{ConfigError, GeometryError};
use crate::projection::{FanFlatGeometry, ProjectionGeometry};
use crate::volume::VolumeGeometry;

fn deserialize_uom_opt<'d, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    Option::<&str>::deserialize(deserializer)?
        .map(str::parse::<T>)
        .transpose()
        .map_err(de::Error::custom)
}

fn deserialize_uom<'d, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    <&str>::deserialize(deserializer)?
        .parse::<T>()
        .map_err(de::Error::custom)
}

fn deserialize_uom_2d<'d, D, T>(deserializer: D) -> Result<(T, T), D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let (x, y) = <(&str, &str)>::deserialize(deserializer)?;
    Ok((x.parse().map_err(de::Error::custom)?,
        y.parse().map_err(de::Error::custom)?))
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub projection: Projection,
    pub volume: Volume,
}

/// Circular fan-beam trajectory with evenly spaced views
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Projection {

    /// Number of views
    pub projections: usize,

    /// Angle covered by the views. A full turn if absent.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_opt")]
    pub arc: Option<Angle>,

    /// Number of detector cells in the flat detector row
    pub detectors: usize,

    #[serde(deserialize_with = "deserialize_uom")]
    pub detector_spacing: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub source_origin: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub origin_detector: Length,
}

/// Reconstruction grid, centred on the centre of rotation
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Volume {
    pub pixels: (usize, usize),

    #[serde(deserialize_with = "deserialize_uom_2d")]
    pub size: (Length, Length),
}

impl Config {

    pub fn projection_geometry(&self) -> Result<ProjectionGeometry, GeometryError> {
        let p = &self.projection;
        let geometry = FanFlatGeometry::evenly_spaced(
            p.projections,
            p.arc.unwrap_or_else(|| turn(1.0)),
            p.detectors,
            p.detector_spacing,
            p.source_origin,
            p.origin_detector,
        );
        geometry.check()?;
        Ok(geometry.into())
    }

    pub fn volume_geometry(&self) -> Result<VolumeGeometry, GeometryError> {
        let volume = VolumeGeometry::new(self.volume.size, self.volume.pixels);
        volume.check()?;
        Ok(volume)
    }
}

impl FromStr for Config {
    type Err = ConfigError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(text)?)
    }
}

pub fn read_config_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.into(), source })?;
    text.parse()
}
