//! Vec-backed record store for sessions without a database file.

use crate::model::geo::Coordinates;
use crate::model::user::{UserFields, UserId, UserRecord};
use crate::repo::user_repo::{RepoError, RepoResult, UserRepository};

/// In-memory user repository; store order is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Vec<UserRecord>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn position(&self, id: UserId) -> RepoResult<usize> {
        self.users
            .iter()
            .position(|user| user.id == id)
            .ok_or(RepoError::NotFound(id))
    }
}

impl UserRepository for InMemoryUserRepository {
    fn list_users(&self) -> RepoResult<Vec<UserRecord>> {
        Ok(self.users.clone())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        Ok(self.users.iter().find(|user| user.id == id).cloned())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<UserRecord>> {
        Ok(self.users.iter().find(|user| user.name == name).cloned())
    }

    fn create_user(
        &mut self,
        fields: UserFields,
        coordinates: Option<Coordinates>,
    ) -> RepoResult<UserRecord> {
        let record = UserRecord::new(fields, coordinates);
        record.validate()?;
        self.users.push(record.clone());
        Ok(record)
    }

    fn update_user(&mut self, record: &UserRecord) -> RepoResult<()> {
        record.validate()?;
        let index = self.position(record.id)?;
        if let Some(slot) = self.users.get_mut(index) {
            *slot = record.clone();
        }
        Ok(())
    }

    fn remove_user(&mut self, id: UserId) -> RepoResult<()> {
        let index = self.position(id)?;
        self.users.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryUserRepository;
    use crate::model::user::UserFields;
    use crate::repo::user_repo::{RepoError, UserRepository};
    use uuid::Uuid;

    #[test]
    fn find_by_name_returns_first_in_insertion_order() {
        let mut repo = InMemoryUserRepository::new();
        let first = repo
            .create_user(UserFields::new("Jan", "Kowalski", 1, "Warszawa"), None)
            .unwrap();
        repo.create_user(UserFields::new("Jan", "Nowak", 2, "Kraków"), None)
            .unwrap();

        let found = repo.find_by_name("Jan").unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn update_keeps_position_in_store_order() {
        let mut repo = InMemoryUserRepository::new();
        let mut first = repo
            .create_user(UserFields::new("Anna", "Nowak", 1, "Gdańsk"), None)
            .unwrap();
        repo.create_user(UserFields::new("Piotr", "Wiśniewski", 7, "Poznań"), None)
            .unwrap();

        first.posts = 12;
        repo.update_user(&first).unwrap();

        let names: Vec<_> = repo
            .list_users()
            .unwrap()
            .into_iter()
            .map(|user| (user.name, user.posts))
            .collect();
        assert_eq!(
            names,
            vec![("Anna".to_string(), 12), ("Piotr".to_string(), 7)]
        );
    }

    #[test]
    fn missing_ids_report_not_found() {
        let mut repo = InMemoryUserRepository::new();
        let id = Uuid::new_v4();
        assert!(matches!(repo.remove_user(id), Err(RepoError::NotFound(missing)) if missing == id));
        assert!(repo.get_user(id).unwrap().is_none());
        assert!(repo.is_empty());
    }
}
