//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{escape_html, FieldError, FormCheck, NAME_MAX_LEN};

/// Full author model from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Build a stored author from validated fields, minting a fresh id
    pub fn from_new(data: NewAuthor) -> Self {
        Self::with_id(Uuid::new_v4(), data)
    }

    /// Build a stored author keeping an existing id
    pub fn with_id(id: Uuid, data: NewAuthor) -> Self {
        Self {
            id,
            first_name: data.first_name,
            family_name: data.family_name,
            date_of_birth: data.date_of_birth,
            date_of_death: data.date_of_death,
        }
    }

    /// "family_name first_name"
    pub fn name(&self) -> String {
        format!("{} {}", self.family_name, self.first_name)
    }

    pub fn url(&self) -> String {
        author_url(self.id)
    }

    /// e.g. "Jan 3, 1892 - Sep 2, 1973"; empty when neither date is known
    pub fn lifespan(&self) -> String {
        match (self.date_of_birth, self.date_of_death) {
            (None, None) => String::new(),
            (birth, death) => format!("{} - {}", medium_date(birth), medium_date(death)),
        }
    }

    pub fn view(&self) -> AuthorView {
        AuthorView {
            id: self.id.to_string(),
            url: self.url(),
            name: self.name(),
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth_formatted: medium_date(self.date_of_birth),
            date_of_death_formatted: medium_date(self.date_of_death),
            lifespan: self.lifespan(),
        }
    }
}

pub fn author_url(id: Uuid) -> String {
    format!("/catalog/author/{}", id)
}

/// Locale-medium rendering used on display pages
pub fn medium_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// ISO rendering used to pre-fill date inputs
pub fn form_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Author with the derived fields templates need
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub id: String,
    pub url: String,
    pub name: String,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth_formatted: String,
    pub date_of_death_formatted: String,
    pub lifespan: String,
}

/// Validated author fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Author form as submitted, or as redisplayed after sanitizing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorForm {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl AuthorForm {
    /// Apply the author rules. The sanitized form is always returned so a
    /// rejected submission can be shown again.
    pub fn check(self) -> (AuthorForm, Result<NewAuthor, Vec<FieldError>>) {
        let mut check = FormCheck::new();

        let first_name = check.required_text(
            "first_name",
            &self.first_name,
            Some(NAME_MAX_LEN),
            format!("First name must be specified or is too long (max {}).", NAME_MAX_LEN),
        );
        check.alphanumeric(
            "first_name",
            &first_name,
            "First name has non-alphanumeric characters.",
        );
        let family_name = check.required_text(
            "family_name",
            &self.family_name,
            Some(NAME_MAX_LEN),
            format!("Family name must be specified or is too long (max {}).", NAME_MAX_LEN),
        );
        check.alphanumeric(
            "family_name",
            &family_name,
            "Family name has non-alphanumeric characters.",
        );
        let date_of_birth =
            check.optional_date("date_of_birth", &self.date_of_birth, "Invalid date of birth");
        let date_of_death =
            check.optional_date("date_of_death", &self.date_of_death, "Invalid date of death");

        let form = AuthorForm {
            first_name: escape_html(&first_name),
            family_name: escape_html(&family_name),
            date_of_birth: self.date_of_birth.trim().to_string(),
            date_of_death: self.date_of_death.trim().to_string(),
        };

        if !check.is_empty() {
            return (form, Err(check.into_errors()));
        }

        let data = NewAuthor {
            first_name: form.first_name.clone(),
            family_name: form.family_name.clone(),
            date_of_birth,
            date_of_death,
        };
        (form, Ok(data))
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            date_of_birth: form_date(author.date_of_birth),
            date_of_death: form_date(author.date_of_death),
        }
    }
}
