use core::fmt;
use std::collections::HashSet;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use super::error::CatalogError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    /// Advisory only, sign-ups are accepted past this number.
    pub max_participants: u32,
    /// In sign-up order.
    pub participants: Vec<String>,
}

impl Activity {
    fn new(description: &str, schedule: &str, max_participants: u32, participants: &[&str]) -> Self {
        Self {
            description: description.to_owned(),
            schedule: schedule.to_owned(),
            max_participants,
            participants: participants.iter().map(|&email| email.to_owned()).collect(),
        }
    }

    #[must_use]
    pub fn is_enrolled(&self, email: &str) -> bool {
        self.participants.iter().any(|participant| participant == email)
    }
}

/// Activities keyed by name, kept in the order they were defined.
///
/// Serializes as a JSON object. Deserializing keeps the key order of the
/// document and does not reject duplicates, [`Catalog::validate`] does.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(String, Activity)>,
}

impl Catalog {
    /// The activities offered by Mergington High School.
    #[must_use]
    pub fn mergington() -> Self {
        [
            (
                "Chess Club",
                Activity::new(
                    "Learn strategies and compete in chess tournaments",
                    "Fridays, 3:30 PM - 5:00 PM",
                    12,
                    &["michael@mergington.edu", "daniel@mergington.edu"],
                ),
            ),
            (
                "Programming Class",
                Activity::new(
                    "Learn programming fundamentals and build software projects",
                    "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                    20,
                    &["emma@mergington.edu", "sophia@mergington.edu"],
                ),
            ),
            (
                "Gym Class",
                Activity::new(
                    "Physical education and sports activities",
                    "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                    30,
                    &["john@mergington.edu", "olivia@mergington.edu"],
                ),
            ),
            (
                "Basketball Team",
                Activity::new(
                    "Competitive basketball league and practice",
                    "Mondays and Wednesdays, 4:00 PM - 5:30 PM",
                    15,
                    &["alex@mergington.edu"],
                ),
            ),
            (
                "Track and Field",
                Activity::new(
                    "Running, jumping, and throwing competitions",
                    "Tuesdays and Thursdays, 4:00 PM - 5:30 PM",
                    25,
                    &["james@mergington.edu", "isabella@mergington.edu"],
                ),
            ),
            (
                "Art Studio",
                Activity::new(
                    "Painting, drawing, and mixed media projects",
                    "Wednesdays, 3:30 PM - 5:00 PM",
                    16,
                    &["mia@mergington.edu"],
                ),
            ),
            (
                "Drama Club",
                Activity::new(
                    "Theater productions and acting workshops",
                    "Fridays, 4:00 PM - 5:30 PM",
                    20,
                    &["lucas@mergington.edu", "ava@mergington.edu"],
                ),
            ),
            (
                "Debate Team",
                Activity::new(
                    "Competitive debate and public speaking skills",
                    "Mondays and Thursdays, 3:30 PM - 4:30 PM",
                    12,
                    &["noah@mergington.edu"],
                ),
            ),
            (
                "Science Club",
                Activity::new(
                    "Experiments, research, and STEM exploration",
                    "Tuesdays, 3:30 PM - 5:00 PM",
                    18,
                    &["grace@mergington.edu", "liam@mergington.edu"],
                ),
            ),
        ]
        .into_iter()
        .map(|(name, activity)| (name.to_owned(), activity))
        .collect()
    }

    /// Reads a JSON catalog from `path` and validates it.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| CatalogError::Read {
                path: path.to_owned(),
                source,
            })?;
        let catalog: Self = serde_json::from_slice(&contents)?;
        catalog.validate()?;
        info!(path = %path.display(), activities = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut names = HashSet::with_capacity(self.entries.len());
        for (name, activity) in &self.entries {
            if !names.insert(name.as_str()) {
                return Err(CatalogError::DuplicateActivity(name.clone()));
            }
            if activity.max_participants == 0 {
                return Err(CatalogError::ZeroCapacity {
                    activity: name.clone(),
                });
            }
            let mut emails = HashSet::with_capacity(activity.participants.len());
            if let Some(email) = activity
                .participants
                .iter()
                .find(|email| !emails.insert(email.as_str()))
            {
                return Err(CatalogError::DuplicateParticipant {
                    activity: name.clone(),
                    email: email.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.entries
            .iter()
            .find_map(|(entry_name, activity)| (entry_name == name).then_some(activity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Activity)> {
        self.entries
            .iter()
            .map(|(name, activity)| (name.as_str(), activity))
    }
}

impl FromIterator<(String, Activity)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, Activity)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Catalog {
    type IntoIter = std::vec::IntoIter<(String, Activity)>;
    type Item = (String, Activity);

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(name, activity)| (name, activity)))
    }
}

struct CatalogVisitor;

impl<'de> Visitor<'de> for CatalogVisitor {
    type Value = Catalog;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map from activity name to activity")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, Activity>()? {
            entries.push(entry);
        }
        Ok(Catalog { entries })
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CatalogVisitor)
    }
}
