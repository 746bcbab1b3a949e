//! On-disk representation of meals.
//!
//! The blob is MessagePack with named fields: an envelope holding a format version and the
//! ordered list of records. Records carry `name`, `photo` (binary, omitted when absent) and
//! `rating`. Decoded records are passed back through [`Meal::new`], so a tampered or corrupted
//! blob can't produce a meal that breaks its invariants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::meal::{Meal, Photo, ValidationError};

/// Version written into every blob. Blobs with a greater version are rejected.
pub const CURRENT_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Error)]
#[error("Failed to encode meals: {0}")]
pub struct EncodeError(#[from] rmp_serde::encode::Error);

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed meal data: {0}")]
    Malformed(#[from] rmp_serde::decode::Error),
    #[error("Meal data uses format version {0}, which is newer than this build supports")]
    UnsupportedVersion(u16),
    #[error("Saved meal is invalid: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Serialize, Deserialize)]
struct MealRecord {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    photo: Option<Vec<u8>>,
    rating: i64,
}

impl From<&Meal> for MealRecord {
    fn from(meal: &Meal) -> Self {
        Self {
            name: meal.name().to_owned(),
            photo: meal.photo().map(|p| p.to_vec()),
            rating: i64::from(meal.rating().value()),
        }
    }
}

impl TryFrom<MealRecord> for Meal {
    type Error = DecodeError;

    fn try_from(record: MealRecord) -> Result<Self, Self::Error> {
        Ok(Meal::new(
            record.name,
            record.photo.map(Photo::from),
            record.rating,
        )?)
    }
}

/// Only the version is read first, so a newer layout is reported as such instead of as
/// malformed data.
#[derive(Debug, Deserialize)]
struct Header {
    version: u16,
}

#[derive(Debug, Serialize, Deserialize)]
struct Blob {
    version: u16,
    meals: Vec<MealRecord>,
}

pub(crate) fn encode_meal(meal: &Meal) -> Result<Vec<u8>, EncodeError> {
    Ok(rmp_serde::to_vec_named(&MealRecord::from(meal))?)
}

pub(crate) fn decode_meal(bytes: &[u8]) -> Result<Meal, DecodeError> {
    rmp_serde::from_slice::<MealRecord>(bytes)?.try_into()
}

pub(crate) fn encode_list(meals: &[Meal]) -> Result<Vec<u8>, EncodeError> {
    let blob = Blob {
        version: CURRENT_FORMAT_VERSION,
        meals: meals.iter().map(MealRecord::from).collect(),
    };

    Ok(rmp_serde::to_vec_named(&blob)?)
}

pub(crate) fn decode_list(bytes: &[u8]) -> Result<Vec<Meal>, DecodeError> {
    let header: Header = rmp_serde::from_slice(bytes)?;
    if header.version > CURRENT_FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(header.version));
    }

    let blob: Blob = rmp_serde::from_slice(bytes)?;
    blob.meals.into_iter().map(Meal::try_from).collect()
}
