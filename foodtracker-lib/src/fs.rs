use std::{
    fs::create_dir_all,
    io::{self, ErrorKind},
    path::PathBuf,
};

use xdg::BaseDirectories;

/// Name of the blob holding the saved meal list inside [`data_dir`].
pub const MEALS_FILE_NAME: &str = "meals";

/// Returns the path to the FoodTracker configuration directory. If it doesn't exist when this
/// function is called, it will be created.
pub fn config_dir() -> io::Result<PathBuf> {
    let path = xdg_prefix().get_config_home().ok_or_else(home_missing)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Returns the path to the FoodTracker data directory. If it doesn't exist when this function is
/// called, it will be created.
pub fn data_dir() -> io::Result<PathBuf> {
    let path = xdg_prefix().get_data_home().ok_or_else(home_missing)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Default location of the saved meal list.
pub fn meals_file() -> io::Result<PathBuf> {
    Ok(data_dir()?.join(MEALS_FILE_NAME))
}

fn xdg_prefix() -> BaseDirectories {
    xdg::BaseDirectories::with_prefix("foodtracker")
}

fn home_missing() -> io::Error {
    io::Error::new(ErrorKind::NotFound, "$HOME must exist")
}
