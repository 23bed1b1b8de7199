//! MemoryDirectory - contact graph held in memory

use std::collections::HashMap;

use contracts::{ContactDirectory, ContractError, GeoPoint, UserId, UserProfile, UserSeed};
use tracing::{debug, warn};

/// Users plus directed contact edges
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    name: String,
    users: HashMap<UserId, UserProfile>,
    edges: HashMap<UserId, Vec<UserId>>,
}

impl MemoryDirectory {
    /// Create an empty directory
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            users: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// Build from configured seeds (assumed validated)
    pub fn from_seeds(name: impl Into<String>, seeds: &[UserSeed]) -> Result<Self, ContractError> {
        let mut directory = Self::new(name);
        for seed in seeds {
            directory.add_user(UserProfile {
                id: seed.id,
                username: seed.username.clone(),
                last_known: seed.last_known(),
            })?;
        }
        for seed in seeds {
            for contact in &seed.contacts {
                directory.add_contact(seed.id, *contact)?;
            }
        }
        debug!(
            directory = %directory.name,
            users = directory.users.len(),
            "Directory seeded"
        );
        Ok(directory)
    }

    /// Insert or replace a user
    pub fn add_user(&mut self, profile: UserProfile) -> Result<(), ContractError> {
        if let Some(point) = &profile.last_known {
            point.check()?;
        }
        self.edges.entry(profile.id).or_default();
        self.users.insert(profile.id, profile);
        Ok(())
    }

    /// Add the directed edge `user_id -> contact_id`
    pub fn add_contact(&mut self, user_id: UserId, contact_id: UserId) -> Result<(), ContractError> {
        if !self.users.contains_key(&contact_id) {
            return Err(ContractError::user_not_found(contact_id));
        }
        let edges = self
            .edges
            .get_mut(&user_id)
            .ok_or_else(|| ContractError::user_not_found(user_id))?;
        if !edges.contains(&contact_id) {
            edges.push(contact_id);
        }
        Ok(())
    }

    /// Add edges in both directions
    pub fn link(&mut self, a: UserId, b: UserId) -> Result<(), ContractError> {
        self.add_contact(a, b)?;
        self.add_contact(b, a)
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory has no users
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl ContactDirectory for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, ContractError> {
        Ok(self.users.get(&user_id).cloned())
    }

    async fn contacts_of(&self, user_id: UserId) -> Result<Vec<UserProfile>, ContractError> {
        let edges = self
            .edges
            .get(&user_id)
            .ok_or_else(|| ContractError::user_not_found(user_id))?;

        let mut contacts = Vec::with_capacity(edges.len());
        for id in edges {
            match self.users.get(id) {
                Some(profile) => contacts.push(profile.clone()),
                None => warn!(directory = %self.name, user_id, contact_id = id, "Dangling contact edge"),
            }
        }
        Ok(contacts)
    }

    async fn update_location(
        &mut self,
        user_id: UserId,
        point: GeoPoint,
    ) -> Result<(), ContractError> {
        point.check()?;
        let profile = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ContractError::user_not_found(user_id))?;
        profile.last_known = Some(point);
        Ok(())
    }
}
