auto_derived!(
    /// Role granted to an actor by the identity provider
    #[derive(Copy, Hash)]
    pub enum Role {
        Admin,
        Moderator,
        Staff,
        User,
    }

    /// An authenticated caller, as supplied by the identity provider
    pub struct Actor {
        /// Unique Id
        pub id: String,
        /// Display handle
        pub username: String,
        /// Roles currently held by this actor
        #[serde(default)]
        pub roles: Vec<Role>,
    }
);

impl Role {
    /// Whether this role may act on the moderation queue
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator | Role::Staff)
    }
}

impl Actor {
    pub fn new(id: impl Into<String>, username: impl Into<String>, roles: Vec<Role>) -> Actor {
        Actor {
            id: id.into(),
            username: username.into(),
            roles,
        }
    }

    /// Whether any held role is staff-capable
    pub fn is_staff(&self) -> bool {
        self.roles.iter().any(Role::is_staff)
    }
}
