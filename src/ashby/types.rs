use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A semi-structured record as returned by the API (application, candidate, ...).
///
/// Values are the tagged JSON variant: string, number, bool, null, array or
/// string-keyed object. Keys keep the order they arrived in.
pub type Record = Map<String, Value>;

/// Related data the `application.info` operation can inline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expand {
    ApplicationFormSubmissions,
    Openings,
    Referrals,
}

impl Expand {
    /// Everything screening uses when enriching an application
    pub const SCREENING: [Expand; 3] = [
        Expand::ApplicationFormSubmissions,
        Expand::Openings,
        Expand::Referrals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Expand::ApplicationFormSubmissions => "applicationFormSubmissions",
            Expand::Openings => "openings",
            Expand::Referrals => "referrals",
        }
    }
}

impl fmt::Display for Expand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Follow `path` through nested objects and return the string at the end.
/// Anything missing or of another type yields `None`.
pub fn str_at<'a>(record: &'a Record, path: &[&str]) -> Option<&'a str> {
    let (last, parents) = path.split_last()?;
    let mut current = record;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)?.as_str()
}
