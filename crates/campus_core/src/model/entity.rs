//! Contract every persisted campus record implements.
//!
//! # Responsibility
//! - Tie a record type to its storage key, ID scheme, status enum and rules.
//! - Build records from validated forms and merge validated patches.
//!
//! # Invariants
//! - `from_form`/`apply_patch` are only called after the entity's `RuleSet`
//!   accepted the input, so parsing inside them cannot fail on valid data.

use crate::model::id::IdScheme;
use crate::session::SessionContext;
use crate::validation::{FormInput, RuleSet};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Number of synthetic records seeded for entities with a demo dataset.
pub const DEMO_DATASET_SIZE: usize = 10;

/// Closed string vocabulary (statuses, categories, priorities).
pub trait ClosedEnum: Copy + Eq + Debug + 'static {
    const ALL: &'static [Self];
    const VALUES: &'static [&'static str];

    fn as_str(self) -> &'static str;
    fn parse(value: &str) -> Option<Self>;
}

/// Values available to `Entity::from_form`.
#[derive(Debug, Clone)]
pub struct NewRecord<'a> {
    pub id: String,
    pub created_at: i64,
    pub session: &'a SessionContext,
}

/// Values available to `Entity::demo_records`.
#[derive(Debug, Clone, Copy)]
pub struct DemoSeed {
    pub now_ms: i64,
    pub today: NaiveDate,
}

impl DemoSeed {
    /// `today + days`, formatted `YYYY-MM-DD`.
    pub fn date_in(&self, days: i64) -> String {
        (self.today + chrono::Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    /// Creation timestamp `minutes` before now.
    pub fn minutes_ago(&self, minutes: i64) -> i64 {
        self.now_ms - minutes * 60_000
    }
}

/// A flat campus record persisted as one element of an entity list.
pub trait Entity: Clone + Debug + PartialEq + Serialize + DeserializeOwned {
    type Status: ClosedEnum;

    /// Fixed key the entity list is stored under.
    const STORAGE_KEY: &'static str;
    /// Plural display name, e.g. "Events".
    const LABEL: &'static str;
    const ID_SCHEME: IdScheme;

    fn rules() -> RuleSet;

    fn id(&self) -> &str;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);

    /// Builds a fully populated record with default status.
    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self;

    /// Overwrites the fields named in `patch`; everything else is kept.
    fn apply_patch(&mut self, patch: &FormInput);

    /// Lowercase text matched by list search.
    fn search_text(&self) -> String;

    /// Synthetic records seeded on first load. Empty when the entity has none.
    fn demo_records(_seed: &DemoSeed) -> Vec<Self> {
        Vec::new()
    }
}

/// Parses a validated closed-vocabulary field.
pub(crate) fn choice<T: ClosedEnum>(form: &FormInput, field: &str) -> T {
    T::parse(&form.text(field)).unwrap_or(T::ALL[0])
}

/// Parses a validated decimal field.
pub(crate) fn decimal(form: &FormInput, field: &str) -> f64 {
    form.text(field).parse().unwrap_or_default()
}

/// Parses a validated integer field.
pub(crate) fn integer<T: std::str::FromStr + Default>(form: &FormInput, field: &str) -> T {
    form.text(field).parse().unwrap_or_default()
}

/// Runs `apply` when `patch` names `field`.
pub(crate) fn patch_field(patch: &FormInput, field: &str, apply: impl FnOnce(&FormInput)) {
    if patch.contains(field) {
        apply(patch);
    }
}

/// Joins searchable values into one lowercase haystack.
pub(crate) fn haystack<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Declares a `ClosedEnum` with serde names matching its string values.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $crate::model::entity::ClosedEnum for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const VALUES: &'static [&'static str] = &[$($text),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            fn parse(value: &str) -> Option<Self> {
                match value.trim() {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::model::entity::ClosedEnum::as_str(*self))
            }
        }
    };
}

pub(crate) use closed_enum;

#[cfg(test)]
mod tests {
    use super::{choice, haystack, ClosedEnum, DemoSeed};
    use crate::validation::FormInput;
    use chrono::NaiveDate;

    closed_enum! {
        pub enum Shade {
            Light => "light",
            DarkGrey => "dark_grey",
        }
    }

    #[test]
    fn closed_enum_round_trips_through_strings_and_serde() {
        assert_eq!(Shade::VALUES, &["light", "dark_grey"]);
        assert_eq!(Shade::parse(" dark_grey "), Some(Shade::DarkGrey));
        assert_eq!(Shade::parse("Dark"), None);
        assert_eq!(Shade::DarkGrey.to_string(), "dark_grey");
        assert_eq!(
            serde_json::to_string(&Shade::DarkGrey).unwrap(),
            "\"dark_grey\""
        );
    }

    #[test]
    fn choice_reads_validated_value() {
        let form = FormInput::new().with("shade", "dark_grey");
        assert_eq!(choice::<Shade>(&form, "shade"), Shade::DarkGrey);
    }

    #[test]
    fn haystack_is_lowercase() {
        assert_eq!(haystack(["Main Hall", "CS"]), "main hall cs");
    }

    #[test]
    fn demo_seed_formats_relative_dates() {
        let seed = DemoSeed {
            now_ms: 0,
            today: NaiveDate::from_ymd_opt(2026, 12, 30).unwrap(),
        };
        assert_eq!(seed.date_in(3), "2027-01-02");
        assert_eq!(seed.minutes_ago(1), -60_000);
    }
}
