use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::{Editable, Entity, check_description, check_title, or_dash, yes_no};
use crate::error::Result;
use crate::form::{FieldErrors, FieldValue, FormModel, rules, unknown_field};
use crate::query::{ListSchema, Sort};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDto {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub categories_count: u32,
}

#[derive(Tabled)]
pub struct SectionRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Categories")]
    categories: u32,
}

impl Entity for SectionDto {
    const PATH: &'static str = "sections";
    type Row = SectionRow;

    fn list_schema() -> ListSchema {
        ListSchema::new()
            .sortable(&["title", "createdAt"])
            .default_sort(Sort::asc("title"))
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> SectionRow {
        SectionRow {
            id: self.id,
            title: self.title.clone(),
            slug: or_dash(Some(&self.slug)),
            active: yes_no(self.is_active),
            categories: self.categories_count,
        }
    }
}

impl Editable for SectionDto {
    type Form = SectionForm;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionForm {
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

impl Default for SectionForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            is_active: true,
        }
    }
}

impl From<&SectionDto> for SectionForm {
    fn from(dto: &SectionDto) -> Self {
        Self {
            title: dto.title.clone(),
            description: dto.description.clone().unwrap_or_default(),
            is_active: dto.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl FormModel for SectionForm {
    type Payload = SectionPayload;
    const FIELDS: &'static [&'static str] = &["title", "description", "isActive"];

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "title" => self.title = value.into_text(field)?,
            "description" => self.description = value.into_text(field)?,
            "isActive" => self.is_active = value.into_bool(field)?,
            _ => return Err(unknown_field(field)),
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_title(&mut errors, &self.title);
        check_description(&mut errors, &self.description);
        errors
    }

    fn to_payload(&self) -> SectionPayload {
        SectionPayload {
            title: self.title.trim().to_string(),
            description: rules::non_blank(&self.description),
            is_active: self.is_active,
        }
    }
}
