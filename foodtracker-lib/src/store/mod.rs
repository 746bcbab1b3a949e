//! The ordered meal list and its persistence.
//!
//! [`MealList`] mutations are purely in memory. Persisting them is up to the caller, which is
//! expected to call [`MealStore::save`] after every accepted change. A save always rewrites the
//! whole list.

use std::{
    fs::{self, create_dir_all},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use derive_more::{Deref, From, Into};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::meal::{Meal, ValidationError};

pub(crate) mod codec;

pub use codec::{CURRENT_FORMAT_VERSION, DecodeError, EncodeError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access the meal store: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("There is no meal at position {index}, the list has {len} meals")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Meals in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, From, Into)]
pub struct MealList(Vec<Meal>);

impl MealList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `meal` and return its position.
    pub fn push(&mut self, meal: Meal) -> usize {
        self.0.push(meal);
        self.0.len() - 1
    }

    /// Insert `meal` at `at`, or at the end when `at` is `None`. Returns the position it ended
    /// up at.
    pub fn insert(&mut self, meal: Meal, at: Option<usize>) -> Result<usize, StoreError> {
        let len = self.0.len();
        match at {
            None => Ok(self.push(meal)),
            Some(index) if index <= len => {
                self.0.insert(index, meal);
                Ok(index)
            }
            Some(index) => Err(StoreError::IndexOutOfBounds { index, len }),
        }
    }

    /// Swap the meal at `index` for `meal`, returning the old one.
    pub fn replace(&mut self, index: usize, meal: Meal) -> Result<Meal, StoreError> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfBounds { index, len })?;

        Ok(std::mem::replace(slot, meal))
    }

    pub fn remove(&mut self, index: usize) -> Result<Meal, StoreError> {
        let len = self.0.len();
        if index >= len {
            return Err(StoreError::IndexOutOfBounds { index, len });
        }

        Ok(self.0.remove(index))
    }
}

impl FromIterator<Meal> for MealList {
    fn from_iter<I: IntoIterator<Item = Meal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MealList {
    type Item = Meal;
    type IntoIter = std::vec::IntoIter<Meal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The meals shown on first launch, before anything has been saved.
pub fn sample_meals() -> Result<MealList, ValidationError> {
    [
        ("Caprese Salad", 4),
        ("Chicken and Potatoes", 5),
        ("Pasta with Meatballs", 3),
    ]
    .into_iter()
    .map(|(name, rating)| Meal::new(name, None, rating))
    .collect()
}

/// Reads and writes the saved [`MealList`] blob at a fixed path.
#[derive(Debug, Clone)]
pub struct MealStore {
    path: PathBuf,
}

impl MealStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved list. Returns `None` if nothing has been saved yet.
    pub fn try_load(&self) -> Result<Option<MealList>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let meals = MealList(codec::decode_list(&bytes)?);
        debug!("Loaded {} meals from {}", meals.len(), self.path.display());

        Ok(Some(meals))
    }

    /// Read the saved list, treating a missing or unreadable blob as an empty list.
    pub fn load(&self) -> MealList {
        match self.try_load() {
            Ok(Some(meals)) => meals,
            Ok(None) => MealList::new(),
            Err(e) => {
                warn!("Unable to load meals from {}: {e}", self.path.display());
                MealList::new()
            }
        }
    }

    /// Read the saved list, falling back to `seed` when there is no usable one.
    ///
    /// A blob that exists but can't be decoded is moved aside first, so saving the seeded list
    /// doesn't overwrite it.
    pub fn load_or_seed<F>(&self, seed: F) -> MealList
    where
        F: FnOnce() -> MealList,
    {
        match self.try_load() {
            Ok(Some(meals)) => meals,
            Ok(None) => {
                debug!("No saved meals at {}", self.path.display());
                seed()
            }
            Err(StoreError::Decode(e)) => {
                warn!("Saved meals at {} are unreadable: {e}", self.path.display());
                match self.backup() {
                    Ok(backup) => warn!("Moved unreadable meals to {}", backup.display()),
                    Err(e) => warn!("Unable to back up unreadable meals: {e}"),
                }
                seed()
            }
            Err(e) => {
                warn!("Unable to load meals from {}: {e}", self.path.display());
                seed()
            }
        }
    }

    /// Replace the saved blob with `meals`.
    ///
    /// The new blob is written to a temporary file next to the old one and renamed over it, so
    /// a failed save leaves the previous blob intact.
    pub fn save(&self, meals: &MealList) -> Result<(), StoreError> {
        let bytes = codec::encode_list(meals)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;

        debug!("Saved {} meals to {}", meals.len(), self.path.display());

        Ok(())
    }

    /// Move the current blob to a timestamped backup next to it. Existing backups are never
    /// overwritten.
    fn backup(&self) -> Result<PathBuf, StoreError> {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let stem = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| crate::fs::MEALS_FILE_NAME.into());
        let mut backup = self.path.with_file_name(format!("{stem}-{timestamp}.bak"));
        let mut attempt = 1;
        while backup.exists() {
            backup = self
                .path
                .with_file_name(format!("{stem}-{timestamp}-{attempt}.bak"));
            attempt += 1;
        }

        fs::rename(&self.path, &backup)?;

        Ok(backup)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::meal::Photo;

    fn meal(name: &str, rating: i64) -> Meal {
        Meal::new(name, None, rating).unwrap()
    }

    #[test]
    fn test_push_and_insert() {
        let mut meals = MealList::new();

        assert_eq!(meals.push(meal("Soup", 1)), 0);
        assert_eq!(meals.insert(meal("Stew", 2), None).unwrap(), 1);
        assert_eq!(meals.insert(meal("Salad", 3), Some(0)).unwrap(), 0);
        assert_eq!(meals.insert(meal("Curry", 4), Some(3)).unwrap(), 3);

        let names: Vec<&str> = meals.iter().map(Meal::name).collect();
        assert_eq!(names, ["Salad", "Soup", "Stew", "Curry"]);
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut meals = MealList::new();

        assert!(matches!(
            meals.insert(meal("Soup", 1), Some(1)),
            Err(StoreError::IndexOutOfBounds { index: 1, len: 0 })
        ));
        assert!(meals.is_empty());
    }

    #[test]
    fn test_replace() {
        let mut meals: MealList = vec![meal("Soup", 1), meal("Stew", 2)].into();

        let old = meals.replace(1, meal("Curry", 5)).unwrap();

        assert_eq!(old.name(), "Stew");
        assert_eq!(meals.get(1).unwrap().name(), "Curry");
        assert_eq!(meals.len(), 2);

        assert!(matches!(
            meals.replace(2, meal("Salad", 3)),
            Err(StoreError::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_remove() {
        let mut meals: MealList = vec![meal("Soup", 1), meal("Stew", 2), meal("Curry", 3)].into();

        assert_eq!(meals.remove(1).unwrap().name(), "Stew");
        assert_eq!(meals.len(), 2);
        assert_eq!(meals.get(1).unwrap().name(), "Curry");

        assert!(matches!(
            meals.remove(5),
            Err(StoreError::IndexOutOfBounds { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_sample_meals() {
        let meals = sample_meals().unwrap();

        assert_eq!(meals.len(), 3);
        assert_eq!(meals.first().unwrap().name(), "Caprese Salad");
        assert_eq!(meals.last().unwrap().rating().value(), 3);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("meals"));

        assert!(store.try_load().unwrap().is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("meals"));

        let meals: MealList = vec![
            meal("Caprese Salad", 4),
            Meal::new("Chicken and Potatoes", Some(Photo::from(vec![7; 32])), 5).unwrap(),
            meal("Pasta with Meatballs", 3),
        ]
        .into();

        store.save(&meals).unwrap();

        assert_eq!(store.load(), meals);
    }

    #[test]
    fn test_save_replaces_whole_list() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("meals"));

        let mut meals: MealList = vec![meal("Soup", 1), meal("Stew", 2)].into();
        store.save(&meals).unwrap();

        meals.remove(0).unwrap();
        store.save(&meals).unwrap();

        assert_eq!(store.load(), meals);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("nested").join("meals"));

        store.save(&vec![meal("Soup", 1)].into()).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn test_load_corrupt() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("meals"));
        fs::write(store.path(), b"definitely not meals").unwrap();

        assert!(matches!(store.try_load(), Err(StoreError::Decode(_))));
        assert!(store.load().is_empty());
        // Plain loading leaves the blob where it is
        assert!(store.path().exists());
    }

    #[test]
    fn test_load_or_seed() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("meals"));

        let seeded = store.load_or_seed(|| sample_meals().unwrap());
        assert_eq!(seeded.len(), 3);

        // A saved empty list is kept as is
        store.save(&MealList::new()).unwrap();
        assert!(store.load_or_seed(|| sample_meals().unwrap()).is_empty());
    }

    #[test]
    fn test_load_or_seed_backs_up_corrupt_blob() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("meals"));
        fs::write(store.path(), b"definitely not meals").unwrap();

        let meals = store.load_or_seed(|| sample_meals().unwrap());

        assert_eq!(meals.len(), 3);
        assert!(!store.path().exists());

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("meals-") && name.ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            fs::read(dir.path().join(backups.first().unwrap())).unwrap(),
            b"definitely not meals"
        );
    }

    #[test]
    fn test_backups_are_not_overwritten() {
        let dir = tempdir().unwrap();
        let store = MealStore::at(dir.path().join("meals"));

        fs::write(store.path(), b"first corrupt blob").unwrap();
        store.load_or_seed(MealList::new);
        fs::write(store.path(), b"second corrupt blob").unwrap();
        store.load_or_seed(MealList::new);

        let mut contents: Vec<Vec<u8>> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "bak"))
            .map(|path| fs::read(path).unwrap())
            .collect();
        contents.sort();

        assert_eq!(
            contents,
            [b"first corrupt blob".to_vec(), b"second corrupt blob".to_vec()]
        );
    }
}
