//! The fixed list of members who can hold a status.

use serde::{Deserialize, Serialize};

const DEFAULT_MEMBERS: &[&str] = &[
    "DJ",
    "Joshua Koo",
    "Jackson Zane",
    "Nirvaan Somany",
    "Ose Okhihan",
    "Quinn Simmons",
    "Alex Nania",
    "Barrow Solomon",
    "Ben Manning",
    "Bobby McAdams",
    "Callen Bronson",
    "Danny Hagenlocker",
    "Drew Cunningham",
    "Gabe George",
    "Garner Duncan",
    "Hudson Addams",
    "Ilan Arias",
    "Justin Huebner",
    "Lucas Gravina",
    "Moritz Schreyogg",
    "Owen Rowe",
    "Patty Holden",
    "Pierce Gurtner",
    "Reid Hammer",
    "Sawyer Rogoff",
    "Tommy McComb",
    "Wiley Kendall",
    "Will Charouhis",
    "Will Reem",
];

/// Sorted, de-duplicated member names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|probe| probe.as_str().cmp(name)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(DEFAULT_MEMBERS)
    }
}

impl From<Vec<String>> for Roster {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.names
    }
}
