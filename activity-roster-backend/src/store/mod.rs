pub mod catalog;
pub mod error;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

pub use self::catalog::{Activity, Catalog};
pub use self::error::{CatalogError, RosterError};

/// Confirmation returned by a successful sign-up or unregistration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnrollResult {
    pub message: String,
}

/// The in-memory rosters of all activities.
///
/// The set of activities is fixed at construction. Every activity has its own
/// lock, so concurrent calls only serialize when they touch the same activity.
#[derive(Debug)]
pub struct RosterStore {
    activities: Vec<(String, Mutex<Activity>)>,
    index: HashMap<String, usize>,
}

impl RosterStore {
    pub fn new(catalog: Catalog) -> Result<Self, CatalogError> {
        catalog.validate()?;
        let activities: Vec<_> = catalog
            .into_iter()
            .map(|(name, activity)| (name, Mutex::new(activity)))
            .collect();
        let index = activities
            .iter()
            .enumerate()
            .map(|(position, (name, _))| (name.clone(), position))
            .collect();
        Ok(Self { activities, index })
    }

    // a panic can't leave a roster half-updated, so a poisoned lock is still usable
    fn lock(&self, name: &str) -> Result<MutexGuard<'_, Activity>, RosterError> {
        let position = *self.index.get(name).ok_or(RosterError::NotFound)?;
        Ok(self.activities[position]
            .1
            .lock()
            .unwrap_or_else(PoisonError::into_inner))
    }

    /// Snapshot of every activity in catalog order.
    #[must_use]
    pub fn list_all(&self) -> Catalog {
        self.activities
            .iter()
            .map(|(name, activity)| {
                (
                    name.clone(),
                    activity
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .clone(),
                )
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Result<Activity, RosterError> {
        Ok(self.lock(name)?.clone())
    }

    pub fn enroll(&self, name: &str, email: &str) -> Result<EnrollResult, RosterError> {
        let mut activity = self.lock(name)?;
        if activity.is_enrolled(email) {
            return Err(RosterError::AlreadyEnrolled {
                email: email.to_owned(),
                activity: name.to_owned(),
            });
        }
        activity.participants.push(email.to_owned());
        let participants = activity.participants.len();
        drop(activity);

        info!(
            activity = name,
            email, participants, "signed up for activity"
        );
        Ok(EnrollResult {
            message: format!("Signed up {email} for {name}"),
        })
    }

    pub fn unenroll(&self, name: &str, email: &str) -> Result<EnrollResult, RosterError> {
        let mut activity = self.lock(name)?;
        let Some(position) = activity
            .participants
            .iter()
            .position(|participant| participant == email)
        else {
            return Err(RosterError::NotEnrolled {
                email: email.to_owned(),
                activity: name.to_owned(),
            });
        };
        activity.participants.remove(position);
        let participants = activity.participants.len();
        drop(activity);

        info!(
            activity = name,
            email, participants, "unregistered from activity"
        );
        Ok(EnrollResult {
            message: format!("Unregistered {email} from {name}"),
        })
    }
}
