//! Core of the FoodTracker meal list.
//!
//! A [`Meal`] is a validated record (name, optional photo, 0 to 5 star rating) and a
//! [`MealList`] is the ordered collection shown to the user. [`MealStore`] persists the whole
//! list as a single blob in the user's data directory.

pub mod config;
pub mod fs;
pub mod meal;
pub mod store;

pub use config::{Config, ConfigError};
pub use meal::{Meal, Photo, Rating, ValidationError};
pub use store::{DecodeError, EncodeError, MealList, MealStore, StoreError, sample_meals};
