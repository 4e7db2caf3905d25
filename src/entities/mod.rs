//! The console's resources: wire DTOs, list schemas and form models.

pub mod category;
pub mod product;
pub mod promo_code;
pub mod section;
pub mod user;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tabled::Tabled;

use crate::error::VitrineError;
use crate::form::{FieldErrors, FormModel, rules};
use crate::query::ListSchema;

pub use category::{CategoryDto, CategoryForm, CategoryPayload};
pub use product::{ProductDto, ProductForm, ProductPayload};
pub use promo_code::{PromoCodeDto, PromoCodeForm, PromoCodePayload, PromoScope};
pub use section::{SectionDto, SectionForm, SectionPayload};
pub use user::UserDto;

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Sections,
    Categories,
    Products,
    PromoCodes,
    Users,
}

enum_display_fromstr!(
    Resource,
    |s| VitrineError::UnknownResource(s.trim().to_string()),
    {
        Sections => "sections" | "section",
        Categories => "categories" | "category",
        Products => "products" | "product",
        PromoCodes => "promo-codes" | "promocodes" | "promo_codes" | "promo-code",
        Users => "users" | "user",
    }
);

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Sections,
        Resource::Categories,
        Resource::Products,
        Resource::PromoCodes,
        Resource::Users,
    ];

    /// Collection path below the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Sections => SectionDto::PATH,
            Resource::Categories => CategoryDto::PATH,
            Resource::Products => ProductDto::PATH,
            Resource::PromoCodes => PromoCodeDto::PATH,
            Resource::Users => UserDto::PATH,
        }
    }

    pub fn list_schema(self) -> ListSchema {
        match self {
            Resource::Sections => SectionDto::list_schema(),
            Resource::Categories => CategoryDto::list_schema(),
            Resource::Products => ProductDto::list_schema(),
            Resource::PromoCodes => PromoCodeDto::list_schema(),
            Resource::Users => UserDto::list_schema(),
        }
    }

    /// Users can be listed but not created, edited or deleted.
    pub fn is_editable(self) -> bool {
        !matches!(self, Resource::Users)
    }
}

/// A row type returned by one REST collection.
pub trait Entity: DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync + 'static {
    const PATH: &'static str;

    /// Table row for terminal output.
    type Row: Tabled;

    fn list_schema() -> ListSchema;

    fn id(&self) -> i64;

    fn row(&self) -> Self::Row;
}

/// An entity with a create/edit dialog.
pub trait Editable: Entity {
    type Form: FormModel + Default + for<'a> From<&'a Self>;
}

/// Decimals arrive either as JSON numbers or as strings (`"12.50"`).
pub(crate) fn de_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

pub(crate) fn check_title(errors: &mut FieldErrors, title: &str) {
    let title = title.trim();
    if title.is_empty() {
        errors.push("title", "Title is required.");
    } else if rules::char_len(title) > TITLE_MAX_CHARS {
        errors.push(
            "title",
            format!("Title must not be longer than {TITLE_MAX_CHARS} characters."),
        );
    }
}

pub(crate) fn check_description(errors: &mut FieldErrors, description: &str) {
    if rules::char_len(description) > DESCRIPTION_MAX_CHARS {
        errors.push(
            "description",
            format!("Description must not be longer than {DESCRIPTION_MAX_CHARS} characters."),
        );
    }
}

pub(crate) fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
