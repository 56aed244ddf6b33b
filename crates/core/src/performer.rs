use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attachment::{Alias, BodyModification, Url};
use crate::error::CoreError;
use crate::ids::PerformerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    TransgenderMale,
    TransgenderFemale,
    Intersex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::TransgenderMale => "TRANSGENDER_MALE",
            Self::TransgenderFemale => "TRANSGENDER_FEMALE",
            Self::Intersex => "INTERSEX",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "TRANSGENDER_MALE" => Ok(Self::TransgenderMale),
            "TRANSGENDER_FEMALE" => Ok(Self::TransgenderFemale),
            "INTERSEX" => Ok(Self::Intersex),
            _ => Err(CoreError::InvalidData(format!("unknown gender: {s}"))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity under edit.
///
/// Attachments are not part of this struct; they are stored as independent
/// rows keyed by `id` and read through the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Performer {
    pub id: PerformerId,
    pub name: String,
    pub disambiguation: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub ethnicity: Option<String>,
    pub country: Option<String>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,
    pub height: Option<i32>,
    pub career_start_year: Option<i32>,
    pub career_end_year: Option<i32>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Performer {
    pub fn new(id: PerformerId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            disambiguation: None,
            gender: None,
            birthdate: None,
            ethnicity: None,
            country: None,
            eye_color: None,
            hair_color: None,
            height: None,
            career_start_year: None,
            career_end_year: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copies every scalar set in `edit` onto `self`. Unset scalars are left
    /// untouched.
    pub fn copy_from_edit(&mut self, edit: &PerformerEdit) {
        if let Some(name) = &edit.name {
            self.name = name.clone();
        }
        copy_opt(&mut self.disambiguation, &edit.disambiguation);
        copy_opt(&mut self.gender, &edit.gender);
        copy_opt(&mut self.birthdate, &edit.birthdate);
        copy_opt(&mut self.ethnicity, &edit.ethnicity);
        copy_opt(&mut self.country, &edit.country);
        copy_opt(&mut self.eye_color, &edit.eye_color);
        copy_opt(&mut self.hair_color, &edit.hair_color);
        copy_opt(&mut self.height, &edit.height);
        copy_opt(&mut self.career_start_year, &edit.career_start_year);
        copy_opt(&mut self.career_end_year, &edit.career_end_year);
    }

    /// Checks that every prior value recorded in `old` still matches this
    /// performer. Returns the first mismatch.
    pub fn validate_modify_edit(&self, old: &PerformerEdit) -> Result<(), FieldMismatch> {
        if let Some(expected) = &old.name {
            check("name", expected, &self.name)?;
        }
        check_opt("disambiguation", &old.disambiguation, &self.disambiguation)?;
        check_opt("gender", &old.gender, &self.gender)?;
        check_opt("birthdate", &old.birthdate, &self.birthdate)?;
        check_opt("ethnicity", &old.ethnicity, &self.ethnicity)?;
        check_opt("country", &old.country, &self.country)?;
        check_opt("eye_color", &old.eye_color, &self.eye_color)?;
        check_opt("hair_color", &old.hair_color, &self.hair_color)?;
        check_opt("height", &old.height, &self.height)?;
        check_opt("career_start_year", &old.career_start_year, &self.career_start_year)?;
        check_opt("career_end_year", &old.career_end_year, &self.career_end_year)?;
        Ok(())
    }
}

fn copy_opt<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}

fn check<T: PartialEq + fmt::Debug>(
    field: &'static str,
    expected: &T,
    actual: &T,
) -> Result<(), FieldMismatch> {
    if expected == actual {
        Ok(())
    } else {
        Err(FieldMismatch {
            field,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

fn check_opt<T: PartialEq + fmt::Debug>(
    field: &'static str,
    expected: &Option<T>,
    actual: &Option<T>,
) -> Result<(), FieldMismatch> {
    match expected {
        Some(value) if expected != actual => Err(FieldMismatch {
            field,
            expected: format!("{value:?}"),
            actual: actual
                .as_ref()
                .map_or_else(|| "unset".to_string(), |v| format!("{v:?}")),
        }),
        _ => Ok(()),
    }
}

/// A prior value recorded in an edit that no longer matches persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {}: expected {} but was {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Scalar snapshot plus attachment deltas for one side of a performer edit.
///
/// Every scalar is optional: `None` means "not part of this edit".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformerEdit {
    pub name: Option<String>,
    pub disambiguation: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub ethnicity: Option<String>,
    pub country: Option<String>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,
    pub height: Option<i32>,
    pub career_start_year: Option<i32>,
    pub career_end_year: Option<i32>,
    #[serde(default)]
    pub added_aliases: Vec<Alias>,
    #[serde(default)]
    pub removed_aliases: Vec<Alias>,
    #[serde(default)]
    pub added_urls: Vec<Url>,
    #[serde(default)]
    pub removed_urls: Vec<Url>,
    #[serde(default)]
    pub added_tattoos: Vec<BodyModification>,
    #[serde(default)]
    pub removed_tattoos: Vec<BodyModification>,
    #[serde(default)]
    pub added_piercings: Vec<BodyModification>,
    #[serde(default)]
    pub removed_piercings: Vec<BodyModification>,
}
