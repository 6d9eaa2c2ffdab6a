//! Numbered console menu over the synchronizer.
//!
//! Operation failures are printed and the loop continues; only I/O errors on
//! the console itself end the session.

use friendmap_core::{
    AppConfig, Geocoder, LeafletMap, RecordState, SyncError, Synchronizer, UserFields,
    UserRecord, UserRepository,
};
use std::io::{self, BufRead, Write};

const MENU: &str = "Welcome to the menu
0. Exit
1. Read a list of friends
2. Add new user
3. Search user
4. Remove user
5. Update user
6. Save a map of one location
7. Save a map of all friends";

/// Console session bound to one input and one output stream.
pub struct Menu<'a, I: BufRead, O: Write> {
    input: &'a mut I,
    output: &'a mut O,
    config: &'a AppConfig,
}

impl<'a, I: BufRead, O: Write> Menu<'a, I, O> {
    pub fn new(input: &'a mut I, output: &'a mut O, config: &'a AppConfig) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    /// Runs until option `0` or end of input.
    pub fn run<R, G>(&mut self, sync: &mut Synchronizer<R, G, LeafletMap>) -> io::Result<()>
    where
        R: UserRepository,
        G: Geocoder,
    {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };
            match choice.as_str() {
                "0" => return Ok(()),
                "1" => self.list_users(sync)?,
                "2" => self.add_user(sync)?,
                "3" => self.search_user(sync)?,
                "4" => self.remove_user(sync)?,
                "5" => self.update_user(sync)?,
                "6" => self.single_map(sync)?,
                "7" => self.full_map(sync)?,
                other => writeln!(self.output, "Unknown option `{other}`.")?,
            }
        }
    }

    fn list_users<R: UserRepository, G: Geocoder>(
        &mut self,
        sync: &mut Synchronizer<R, G, LeafletMap>,
    ) -> io::Result<()> {
        let users = match sync.refresh() {
            Ok(users) => users,
            Err(err) => return self.report(&err),
        };
        writeln!(self.output, "About your friends:")?;
        for user in users {
            let record = &user.record;
            write!(
                self.output,
                "\tYour friend {} {} sends {} posts.",
                record.name, record.surname, record.posts
            )?;
            if user.state() == RecordState::Unresolved {
                write!(self.output, " (location `{}` unresolved)", record.location)?;
            }
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn add_user<R: UserRepository, G: Geocoder>(
        &mut self,
        sync: &mut Synchronizer<R, G, LeafletMap>,
    ) -> io::Result<()> {
        let Some(name) = self.prompt("Type new user name: ")? else {
            return Ok(());
        };
        let Some(surname) = self.prompt("Type new user surname: ")? else {
            return Ok(());
        };
        let Some(posts) = self.prompt_posts("Type how many posts did new user publish: ")? else {
            return Ok(());
        };
        let Some(location) = self.prompt("Type new user location: ")? else {
            return Ok(());
        };

        match sync.create(UserFields::new(name, surname, posts, location)) {
            Ok(user) => {
                let record = &user.record;
                writeln!(
                    self.output,
                    "Added {} {} at {}.",
                    record.name,
                    record.surname,
                    describe_position(record)
                )
            }
            Err(err) => self.report(&err),
        }
    }

    fn search_user<R: UserRepository, G: Geocoder>(
        &mut self,
        sync: &mut Synchronizer<R, G, LeafletMap>,
    ) -> io::Result<()> {
        let Some(name) = self.prompt("Who do you look for (name): ")? else {
            return Ok(());
        };
        match sync.find_by_name(&name) {
            Ok(Some(record)) => writeln!(
                self.output,
                "{} {}, {} posts, lives in {} {}",
                record.name,
                record.surname,
                record.posts,
                record.location,
                describe_position(&record)
            ),
            Ok(None) => writeln!(self.output, "No friend named `{name}`."),
            Err(err) => self.report(&err),
        }
    }

    fn remove_user<R: UserRepository, G: Geocoder>(
        &mut self,
        sync: &mut Synchronizer<R, G, LeafletMap>,
    ) -> io::Result<()> {
        let Some(name) = self.prompt("Type a name of user to be removed: ")? else {
            return Ok(());
        };
        match sync.remove_by_name(&name) {
            Ok(removed) => writeln!(
                self.output,
                "Removed {} {}.",
                removed.record.name, removed.record.surname
            ),
            Err(err) => self.report(&err),
        }
    }

    fn update_user<R: UserRepository, G: Geocoder>(
        &mut self,
        sync: &mut Synchronizer<R, G, LeafletMap>,
    ) -> io::Result<()> {
        let Some(name) = self.prompt("Type a name of user you like to update: ")? else {
            return Ok(());
        };
        let existing = match sync.find_by_name(&name) {
            Ok(Some(record)) => record,
            Ok(None) => return writeln!(self.output, "No friend named `{name}`."),
            Err(err) => return self.report(&err),
        };

        let Some(new_name) = self.prompt("Type new name: ")? else {
            return Ok(());
        };
        let Some(surname) = self.prompt("Type new surname: ")? else {
            return Ok(());
        };
        let Some(posts) = self.prompt_posts("Type new number of posts: ")? else {
            return Ok(());
        };
        let Some(location) = self.prompt("Type new location (empty keeps current): ")? else {
            return Ok(());
        };
        let location = if location.is_empty() {
            existing.location.clone()
        } else {
            location
        };

        match sync.update(existing.id, UserFields::new(new_name, surname, posts, location)) {
            Ok(user) => writeln!(
                self.output,
                "Updated {} {} at {}.",
                user.record.name,
                user.record.surname,
                describe_position(&user.record)
            ),
            Err(err) => self.report(&err),
        }
    }

    fn single_map<R: UserRepository, G: Geocoder>(
        &mut self,
        sync: &mut Synchronizer<R, G, LeafletMap>,
    ) -> io::Result<()> {
        let Some(location) = self.prompt("Type a location: ")? else {
            return Ok(());
        };
        let coords = match sync.locate(&location) {
            Ok(coords) => coords,
            Err(err) => return self.report(&err),
        };
        let path = self.config.single_map_path(&location);
        match LeafletMap::single_location(coords, &location).and_then(|map| map.save(&path)) {
            Ok(()) => writeln!(self.output, "Map saved to {}.", path.display()),
            Err(err) => self.report(&SyncError::from(err)),
        }
    }

    fn full_map<R: UserRepository, G: Geocoder>(
        &mut self,
        sync: &mut Synchronizer<R, G, LeafletMap>,
    ) -> io::Result<()> {
        if let Err(err) = sync.refresh() {
            return self.report(&err);
        }
        let path = self.config.common_map_path();
        match sync.display().save(&path) {
            Ok(()) => writeln!(self.output, "Map saved to {}.", path.display()),
            Err(err) => self.report(&SyncError::from(err)),
        }
    }

    fn report(&mut self, err: &SyncError) -> io::Result<()> {
        writeln!(self.output, "Error: {err}")
    }

    /// Reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_posts(&mut self, label: &str) -> io::Result<Option<u32>> {
        let Some(value) = self.prompt(label)? else {
            return Ok(None);
        };
        match value.parse::<u32>() {
            Ok(posts) => Ok(Some(posts)),
            Err(_) => {
                writeln!(
                    self.output,
                    "Invalid number of posts `{value}`; expected a non-negative integer."
                )?;
                Ok(None)
            }
        }
    }
}

fn describe_position(record: &UserRecord) -> String {
    record
        .coordinates
        .map_or_else(|| "an unresolved position".to_string(), |coords| coords.to_string())
}
