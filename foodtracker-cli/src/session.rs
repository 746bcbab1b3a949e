use std::path::PathBuf;

use foodtracker_lib::{Config, MealList, MealStore, sample_meals};
use sysexits::ExitCode;
use tracing::{debug, error, warn};

use crate::fail;

/// The meal list for one invocation, along with where it gets saved.
pub struct Session {
    store: MealStore,
    pub meals: MealList,
}

impl Session {
    pub fn open(file: Option<PathBuf>) -> Result<Self, ExitCode> {
        let cfg = Config::load().unwrap_or_else(|e| {
            warn!("Using the default configuration: {e}");
            Config::default()
        });

        let store = match file {
            Some(path) => MealStore::at(path),
            None => cfg.store().map_err(|e| fail(ExitCode::CantCreat, e))?,
        };

        Ok(Self::with_store(store, cfg.seed_sample_meals))
    }

    /// Load the list from `store`. An unreadable blob is always moved aside before anything can
    /// be saved over it, whether or not the sample meals are seeded.
    pub fn with_store(store: MealStore, seed_sample_meals: bool) -> Self {
        let meals = if seed_sample_meals {
            store.load_or_seed(|| sample_meals().unwrap_or_default())
        } else {
            store.load_or_seed(MealList::new)
        };

        Self { store, meals }
    }

    /// Write the current list out. A failure is logged and the in-memory list stays as it is.
    pub fn save(&self) {
        match self.store.save(&self.meals) {
            Ok(()) => debug!("Meals successfully saved"),
            Err(e) => error!("Failed to save meals to {}: {e}", self.store.path().display()),
        }
    }
}
