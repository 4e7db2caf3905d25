//! Products. Prices are edited as text so that `12,50` and a half-typed
//! `12.` survive until validation looks at them.

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::{Editable, Entity, check_description, check_title, de_decimal, or_dash, yes_no};
use crate::error::Result;
use crate::form::rules::{self, Number};
use crate::form::{FieldErrors, FieldValue, FormModel, unknown_field};
use crate::query::{FilterDef, FilterKind, ListSchema, Sort};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_decimal")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "de_decimal")]
    pub discount_price: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub section_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub images_count: u32,
}

#[derive(Tabled)]
pub struct ProductRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Discount")]
    discount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Images")]
    images: u32,
}

impl Entity for ProductDto {
    const PATH: &'static str = "products";
    type Row = ProductRow;

    fn list_schema() -> ListSchema {
        ListSchema::new()
            .filter(FilterDef::new("sectionId", FilterKind::Integer))
            .filter(FilterDef::new("categoryId", FilterKind::Integer))
            .filter(FilterDef::new("active", FilterKind::Bool).with_wire_key("isActive"))
            .sortable(&["title", "price", "createdAt"])
            .default_sort(Sort::asc("title"))
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> ProductRow {
        ProductRow {
            id: self.id,
            title: self.title.clone(),
            price: or_dash(self.price.as_deref()),
            discount: or_dash(self.discount_price.as_deref()),
            category: or_dash(self.category_id.map(|id| format!("#{id}")).as_deref()),
            active: yes_no(self.is_active),
            images: self.images_count,
        }
    }
}

impl Editable for ProductDto {
    type Form = ProductForm;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub discount_price: String,
    pub category_id: Option<i64>,
    pub is_active: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: String::new(),
            discount_price: String::new(),
            category_id: None,
            is_active: true,
        }
    }
}

impl From<&ProductDto> for ProductForm {
    fn from(dto: &ProductDto) -> Self {
        Self {
            title: dto.title.clone(),
            description: dto.description.clone().unwrap_or_default(),
            price: dto.price.clone().unwrap_or_default(),
            discount_price: dto.discount_price.clone().unwrap_or_default(),
            category_id: dto.category_id,
            is_active: dto.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub category_id: Option<i64>,
    pub is_active: bool,
}

impl FormModel for ProductForm {
    type Payload = ProductPayload;
    const FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "price",
        "discountPrice",
        "categoryId",
        "isActive",
    ];
    const COMPOSITE_FIELD: Option<&'static str> = Some("images");

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "title" => self.title = value.into_text(field)?,
            "description" => self.description = value.into_text(field)?,
            "price" => self.price = value.into_text(field)?,
            "discountPrice" => self.discount_price = value.into_text(field)?,
            "categoryId" => self.category_id = value.into_id(field)?,
            "isActive" => self.is_active = value.into_bool(field)?,
            _ => return Err(unknown_field(field)),
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_title(&mut errors, &self.title);
        check_description(&mut errors, &self.description);

        let price = match rules::number(&self.price) {
            Number::Missing => {
                errors.push("price", "Price is required.");
                None
            }
            Number::Invalid => {
                errors.push("price", "Price must be a number.");
                None
            }
            Number::Value(price) if price < 0.0 => {
                errors.push("price", "Price must not be negative.");
                None
            }
            Number::Value(price) => Some(price),
        };

        match rules::number(&self.discount_price) {
            Number::Missing => {}
            Number::Invalid => errors.push("discountPrice", "Discount price must be a number."),
            Number::Value(discount) if discount < 0.0 => {
                errors.push("discountPrice", "Discount price must not be negative.");
            }
            Number::Value(discount) => {
                if price.is_some_and(|price| discount >= price) {
                    errors.push("discountPrice", "Discount price must be lower than price.");
                }
            }
        }

        if self.category_id.is_none() {
            errors.push("categoryId", "Category is required.");
        }
        errors
    }

    fn to_payload(&self) -> ProductPayload {
        ProductPayload {
            title: self.title.trim().to_string(),
            description: rules::non_blank(&self.description),
            price: rules::parse_decimal(&self.price).unwrap_or_default(),
            discount_price: rules::parse_decimal(&self.discount_price),
            category_id: self.category_id,
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lamp() -> ProductForm {
        ProductForm {
            title: "Desk lamp".into(),
            price: "10".into(),
            category_id: Some(3),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(lamp().validate().is_empty());
    }

    #[test]
    fn test_price_messages() {
        let mut form = lamp();
        for (raw, message) in [
            ("", "Price is required."),
            ("ten", "Price must be a number."),
            ("-1", "Price must not be negative."),
        ] {
            form.price = raw.into();
            assert_eq!(form.validate().first("price"), Some(message), "price {raw:?}");
        }
    }

    #[test]
    fn test_discount_must_be_strictly_lower() {
        let mut form = lamp();
        form.discount_price = "15".into();
        assert_eq!(
            form.validate().first("discountPrice"),
            Some("Discount price must be lower than price.")
        );
        form.discount_price = "10".into();
        assert!(form.validate().contains("discountPrice"));
        form.discount_price = "9,99".into();
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_discount_not_compared_with_invalid_price() {
        let mut form = lamp();
        form.price = "abc".into();
        form.discount_price = "5".into();
        let errors = form.validate();
        assert!(errors.contains("price"));
        assert!(!errors.contains("discountPrice"));
    }

    #[test]
    fn test_payload_uses_numbers() {
        let mut form = lamp();
        form.price = "12,50".into();
        form.discount_price = " ".into();
        form.description = "Warm light".into();
        assert_eq!(
            serde_json::to_value(form.to_payload()).unwrap(),
            json!({
                "title": "Desk lamp",
                "description": "Warm light",
                "price": 12.5,
                "discountPrice": null,
                "categoryId": 3,
                "isActive": true
            })
        );
    }

    #[test]
    fn test_dto_prices_as_strings_or_numbers() {
        let dto: ProductDto = serde_json::from_value(json!({
            "id": 1,
            "title": "Desk lamp",
            "price": "10.00",
            "discountPrice": 8.5,
            "categoryId": 3,
            "isActive": true
        }))
        .unwrap();
        let form = ProductForm::from(&dto);
        assert_eq!(form.price, "10.00");
        assert_eq!(form.discount_price, "8.5");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_active_filter_goes_out_as_is_active() {
        let schema = ProductDto::list_schema();
        let def = schema.filter_def("active").unwrap();
        assert_eq!(def.wire_key, "isActive");
        assert!(schema.is_sortable("price"));
        assert!(!schema.is_sortable("discountPrice"));
    }
}
