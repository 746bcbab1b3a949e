use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;
use foodtracker_lib::{Meal, Photo, Rating};
use sysexits::ExitCode;

use crate::{fail, session::Session};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List meals
    List,
    /// Show a single meal
    Show { position: usize },
    /// Add a new meal
    Add {
        name: String,
        /// Star rating from 0 to 5
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        rating: i64,
        /// Image file to attach
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Replace a meal with an edited copy
    Edit {
        position: usize,
        #[arg(short, long)]
        name: Option<String>,
        /// Star rating from 0 to 5
        #[arg(short, long, allow_negative_numbers = true)]
        rating: Option<i64>,
        /// Image file to attach
        #[arg(long, conflicts_with = "clear_photo")]
        photo: Option<PathBuf>,
        /// Remove the attached photo
        #[arg(long)]
        clear_photo: bool,
    },
    /// Tap a star. Tapping the current rating's star resets it to zero
    Rate { position: usize, star: u8 },
    /// Delete a meal
    Remove { position: usize },
}

pub fn handle(session: &mut Session, cmd: &Command) -> Result<(), ExitCode> {
    match cmd {
        Command::List => {
            if session.meals.is_empty() {
                println!("No meals yet");
            }
            for (index, meal) in session.meals.iter().enumerate() {
                let photo = if meal.photo().is_some() {
                    " (photo)".dimmed().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{:>3}  {}  {}{photo}",
                    index + 1,
                    meal.rating().stars().yellow(),
                    meal.name()
                );
            }
        }
        Command::Show { position } => {
            let meal = get(session, *position)?;
            println!("{}", meal.name().bold());
            println!(
                "{}  {}",
                meal.rating().stars().yellow(),
                meal.rating().describe()
            );
            match meal.photo() {
                Some(photo) => println!("Photo: {} bytes", photo.len()),
                None => println!("Photo: none"),
            }
        }
        Command::Add {
            name,
            rating,
            photo,
        } => {
            let photo = photo.as_deref().map(read_photo).transpose()?;
            let meal =
                Meal::new(name.as_str(), photo, *rating).map_err(|e| fail(ExitCode::DataErr, e))?;

            let position = session.meals.push(meal) + 1;
            session.save();

            println!("Added {name} at position {position}");
        }
        Command::Edit {
            position,
            name,
            rating,
            photo,
            clear_photo,
        } => {
            let mut meal = get(session, *position)?.clone();

            if let Some(name) = name {
                meal = meal
                    .with_name(name.as_str())
                    .map_err(|e| fail(ExitCode::DataErr, e))?;
            }
            if let Some(rating) = rating {
                let rating = Rating::new(*rating).map_err(|e| fail(ExitCode::DataErr, e))?;
                meal = meal.with_rating(rating);
            }
            if let Some(path) = photo {
                meal = meal.with_photo(Some(read_photo(path)?));
            } else if *clear_photo {
                meal = meal.with_photo(None);
            }

            replace(session, *position, meal)?;
            session.save();
        }
        Command::Rate { position, star } => {
            let meal = get(session, *position)?;
            let rating = meal
                .rating()
                .tap(*star)
                .map_err(|e| fail(ExitCode::DataErr, e))?;
            let meal = meal.with_rating(rating);

            replace(session, *position, meal)?;
            session.save();

            println!("{}  {}", rating.stars().yellow(), rating.describe());
        }
        Command::Remove { position } => {
            get(session, *position)?;
            let index = to_index(*position)?;
            let meal = session
                .meals
                .remove(index)
                .map_err(|e| fail(ExitCode::Usage, e))?;
            session.save();

            println!("Removed {}", meal.name());
        }
    }

    Ok(())
}

/// Positions shown to the user start at one.
fn to_index(position: usize) -> Result<usize, ExitCode> {
    position
        .checked_sub(1)
        .ok_or_else(|| fail(ExitCode::Usage, "Positions start at 1"))
}

fn get(session: &Session, position: usize) -> Result<&Meal, ExitCode> {
    let index = to_index(position)?;
    session.meals.get(index).ok_or_else(|| {
        fail(
            ExitCode::Usage,
            format!(
                "There is no meal at position {position}, the list has {} meals",
                session.meals.len()
            ),
        )
    })
}

fn replace(session: &mut Session, position: usize, meal: Meal) -> Result<(), ExitCode> {
    let index = to_index(position)?;
    session
        .meals
        .replace(index, meal)
        .map_err(|e| fail(ExitCode::Usage, e))?;

    Ok(())
}

fn read_photo(path: &Path) -> Result<Photo, ExitCode> {
    Photo::read(path)
        .map_err(|e| fail(ExitCode::NoInput, format!("Unable to read {}: {e}", path.display())))
}
