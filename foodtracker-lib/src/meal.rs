//! The validated meal record.
//!
//! A [`Meal`] can only be obtained through [`Meal::new`] (or by decoding bytes, which runs the
//! same validation), so every instance has a non-empty name and a rating within
//! `0..=Rating::MAX`. Edits never mutate a meal in place; the `with_*` methods build a
//! replacement.

use std::{fs, io, path::Path};

use derive_more::{Deref, Display, From, Into};
use thiserror::Error;

use crate::store::codec::{self, DecodeError, EncodeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A meal must have a name")]
    InvalidName,
    #[error("Rating {0} is outside of the range 0 to 5")]
    InvalidRating(i64),
}

/// A star rating between zero (no rating) and [`Rating::MAX`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Into)]
pub struct Rating(u8);

impl Rating {
    pub const ZERO: Rating = Rating(0);
    /// Number of stars a meal can be given.
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or(ValidationError::InvalidRating(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The rating after the user taps the `star`th star (counting from one).
    ///
    /// Tapping the star that matches the current rating clears it back to zero.
    pub fn tap(self, star: u8) -> Result<Self, ValidationError> {
        if star == 0 || star > Self::MAX {
            return Err(ValidationError::InvalidRating(i64::from(star)));
        }

        if star == self.0 {
            Ok(Self::ZERO)
        } else {
            Ok(Self(star))
        }
    }

    /// Spoken description of the rating.
    pub fn describe(self) -> String {
        match self.0 {
            0 => "No rating set.".into(),
            1 => "1 star set.".into(),
            n => format!("{n} stars set."),
        }
    }

    /// Filled stars up to the rating, empty ones after it.
    pub fn stars(self) -> String {
        (1..=Self::MAX)
            .map(|star| if star <= self.0 { '★' } else { '☆' })
            .collect()
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Raw image bytes attached to a meal. The format is whatever the caller captured.
#[derive(Debug, Clone, PartialEq, Eq, Deref, From, Into)]
pub struct Photo(Vec<u8>);

impl Photo {
    pub fn read(path: &Path) -> io::Result<Self> {
        Ok(Self(fs::read(path)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    name: String,
    photo: Option<Photo>,
    rating: Rating,
}

impl Meal {
    /// Create a new [`Meal`]. Fails if `name` is empty or `rating` is outside of
    /// `0..=Rating::MAX`.
    pub fn new(
        name: impl Into<String>,
        photo: Option<Photo>,
        rating: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::InvalidName);
        }

        let rating = Rating::new(rating)?;

        Ok(Self {
            name,
            photo,
            rating,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// A copy of this meal under a different name.
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(name, self.photo.clone(), i64::from(self.rating.value()))
    }

    pub fn with_photo(&self, photo: Option<Photo>) -> Self {
        Self {
            photo,
            ..self.clone()
        }
    }

    pub fn with_rating(&self, rating: Rating) -> Self {
        Self {
            rating,
            ..self.clone()
        }
    }

    /// Serialize this meal on its own, as a keyed record of `name`, `photo` and `rating`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        codec::encode_meal(self)
    }

    /// Decode a meal written by [`Meal::to_bytes`]. The decoded fields are validated again.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::decode_meal(bytes)
    }
}
