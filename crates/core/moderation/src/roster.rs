use std::sync::Arc;

use futures::lock::Mutex;

use warden_models::v0::Actor;
use warden_result::Result;

/// Query capability over the identity provider's role assignments
///
/// Consulted on every fan-out rather than cached; membership may
/// change between reports.
#[async_trait]
pub trait AbstractRoster: Sync + Send {
    /// Ids of all actors currently holding a staff-capable role
    async fn staff_roster(&self) -> Result<Vec<String>>;
}

/// Reference implementation backed by an in-memory member list
#[derive(Clone, Default)]
pub struct ReferenceRoster {
    members: Arc<Mutex<Vec<Actor>>>,
}

impl ReferenceRoster {
    pub fn new(members: Vec<Actor>) -> ReferenceRoster {
        ReferenceRoster {
            members: Arc::new(Mutex::new(members)),
        }
    }

    /// Add or replace a member
    pub async fn upsert(&self, actor: Actor) {
        let mut members = self.members.lock().await;
        members.retain(|member| member.id != actor.id);
        members.push(actor);
    }

    /// Remove a member
    pub async fn remove(&self, actor_id: &str) {
        let mut members = self.members.lock().await;
        members.retain(|member| member.id != actor_id);
    }
}

#[async_trait]
impl AbstractRoster for ReferenceRoster {
    async fn staff_roster(&self) -> Result<Vec<String>> {
        let members = self.members.lock().await;
        Ok(members
            .iter()
            .filter(|member| member.is_staff())
            .map(|member| member.id.to_string())
            .collect())
    }
}
