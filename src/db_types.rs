//! Record shapes persisted in the document store.
//!
//! Each record type lives in the collection named after it, lowercased
//! (`CallLog` -> `calllog`). `User` and `Product` have no endpoints yet but are
//! kept valid so they can be stored the same way.

use crate::error::{FieldError, ValidationError};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Value of `source` when the submitter does not name itself.
pub const DEFAULT_SOURCE: &str = "ai-receptionist";

/// Collection holding records of type `T`.
pub fn collection_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full).to_lowercase()
}

/// A closed set of text values, stored and exchanged as their literal text.
pub trait ClosedSet: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == text)
    }

    /// `'a', 'b' or 'c'`
    fn expected() -> String {
        let quoted: Vec<String> = Self::ALL.iter().map(|v| format!("'{}'", v.as_str())).collect();
        match quoted.split_last() {
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
            None => String::new(),
        }
    }
}

macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl ClosedSet for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set! {
    /// What the caller is enquiring about.
    Category {
        Structural => "Structural",
        Civil => "Civil",
        Geotechnical => "Geotechnical",
        NewEnquiry => "New Enquiry",
        Other => "Other",
    }
}

closed_set! {
    #[derive(Default)]
    Priority {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
    }
}

closed_set! {
    /// Workflow status of a logged call
    #[derive(Default)]
    Status {
        #[default]
        New => "new",
        InProgress => "in_progress",
        Closed => "closed",
    }
}

/// Caller record from the AI receptionist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLog {
    /// Name of the caller, if provided
    pub caller_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Company or organization
    pub company: Option<String>,
    pub category: Category,
    /// Short subject or title
    pub subject: Option<String>,
    /// Transcribed message or notes
    pub message: Option<String>,
    /// System that created the log
    pub source: String,
    /// Engineer or team assigned
    pub assigned_to: Option<String>,
    pub priority: Priority,
    pub status: Status,
}

/// Raw body of `POST /api/calls`. Nothing is checked until it is turned into a
/// [`CallLog`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallLogCreate {
    pub caller_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    /// `Some(None)` when the body holds an explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub source: Option<Option<String>>,
    pub assigned_to: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(d).map(Some)
}

/// Parse one closed-set field, falling back to `default` when absent. A missing
/// field with no default is an error, as is any text outside the set.
fn member<T: ClosedSet>(
    field: &'static str,
    raw: Option<&str>,
    default: Option<T>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match raw {
        None => {
            if default.is_none() {
                errors.push(FieldError::new(field, "field required"));
            }
            default
        }
        Some(text) => {
            let parsed = T::parse(text);
            if parsed.is_none() {
                errors.push(FieldError::new(
                    field,
                    format!("input should be {}, got '{text}'", T::expected()),
                ));
            }
            parsed
        }
    }
}

impl TryFrom<CallLogCreate> for CallLog {
    type Error = ValidationError;

    fn try_from(raw: CallLogCreate) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();
        let category = member::<Category>("category", raw.category.as_deref(), None, &mut errors);
        let priority = member(
            "priority",
            raw.priority.as_deref(),
            Some(Priority::default()),
            &mut errors,
        );
        let status = member(
            "status",
            raw.status.as_deref(),
            Some(Status::default()),
            &mut errors,
        );
        let source = match raw.source {
            None => Some(DEFAULT_SOURCE.to_string()),
            Some(Some(source)) => Some(source),
            Some(None) => {
                errors.push(FieldError::new("source", "input should be a valid string"));
                None
            }
        };

        match (category, priority, status, source) {
            (Some(category), Some(priority), Some(status), Some(source)) if errors.is_empty() => {
                Ok(CallLog {
                    caller_name: raw.caller_name,
                    phone: raw.phone,
                    email: raw.email,
                    company: raw.company,
                    category,
                    subject: raw.subject,
                    message: raw.message,
                    source,
                    assigned_to: raw.assigned_to,
                    priority,
                    status,
                })
            }
            _ => Err(ValidationError(errors)),
        }
    }
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Full name
    pub name: String,
    pub email: String,
    pub address: String,
    /// Age in years, at most 120
    pub age: Option<u8>,
    #[serde(default = "yes")]
    pub is_active: bool,
}

impl User {
    pub const MAX_AGE: u8 = 120;

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.age {
            Some(age) if age > Self::MAX_AGE => Err(ValidationError::single(
                "age",
                format!("input should be less than or equal to {}", Self::MAX_AGE),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: Option<String>,
    /// Price in dollars
    pub price: f64,
    pub category: String,
    #[serde(default = "yes")]
    pub in_stock: bool,
}

impl Product {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.price.is_nan() || self.price < 0.0 {
            return Err(ValidationError::single(
                "price",
                "input should be greater than or equal to 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(category: Option<&str>) -> CallLogCreate {
        CallLogCreate {
            category: category.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn collection_names_follow_type_names() {
        assert_eq!(collection_name::<CallLog>(), "calllog");
        assert_eq!(collection_name::<User>(), "user");
        assert_eq!(collection_name::<Product>(), "product");
    }

    #[test]
    fn defaults_applied_to_omitted_fields() {
        let log = CallLog::try_from(CallLogCreate {
            caller_name: Some("Jane Doe".into()),
            message: Some("Beam inspection".into()),
            ..create(Some("Structural"))
        })
        .unwrap();
        assert_eq!(log.category, Category::Structural);
        assert_eq!(log.priority, Priority::Medium);
        assert_eq!(log.status, Status::New);
        assert_eq!(log.source, DEFAULT_SOURCE);
        assert_eq!(log.caller_name.as_deref(), Some("Jane Doe"));
        assert_eq!(log.phone, None);
    }

    #[test]
    fn every_category_is_accepted() {
        for category in Category::ALL {
            let log = CallLog::try_from(create(Some(category.as_str()))).unwrap();
            assert_eq!(log.category, *category);
        }
    }

    #[test]
    fn missing_category_is_rejected() {
        let err = CallLog::try_from(create(None)).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["category"]);
        assert!(err.to_string().contains("field required"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        for bad in ["Electrical", "structural", "", "New  Enquiry"] {
            let err = CallLog::try_from(create(Some(bad))).unwrap_err();
            assert_eq!(err.fields().collect::<Vec<_>>(), vec!["category"], "{bad}");
        }
    }

    #[test]
    fn all_bad_fields_reported_together() {
        let err = CallLog::try_from(CallLogCreate {
            priority: Some("urgent".into()),
            status: Some("done".into()),
            ..create(Some("Bridges"))
        })
        .unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["category", "priority", "status"]
        );
    }

    #[test]
    fn explicit_values_kept() {
        let log = CallLog::try_from(CallLogCreate {
            source: Some(Some("web-form".into())),
            priority: Some("high".into()),
            status: Some("in_progress".into()),
            ..create(Some("New Enquiry"))
        })
        .unwrap();
        assert_eq!(log.category, Category::NewEnquiry);
        assert_eq!(log.source, "web-form");
        assert_eq!(log.priority, Priority::High);
        assert_eq!(log.status, Status::InProgress);
    }

    #[test]
    fn null_priority_and_status_take_defaults() {
        let raw: CallLogCreate = serde_json::from_str(
            r#"{"category": "Civil", "priority": null, "status": null}"#,
        )
        .unwrap();
        let log = CallLog::try_from(raw).unwrap();
        assert_eq!(log.priority, Priority::Medium);
        assert_eq!(log.status, Status::New);
        assert_eq!(log.source, DEFAULT_SOURCE);
    }

    #[test]
    fn null_source_is_rejected() {
        let raw: CallLogCreate =
            serde_json::from_str(r#"{"category": "Civil", "source": null}"#).unwrap();
        assert_eq!(raw.source, Some(None));
        let err = CallLog::try_from(raw).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["source"]);
    }

    #[test]
    fn closed_set_defaults() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Status::default(), Status::New);
    }

    #[test]
    fn closed_sets_serialize_as_literals() {
        assert_eq!(
            serde_json::to_value(Category::NewEnquiry).unwrap(),
            "New Enquiry"
        );
        assert_eq!(serde_json::to_value(Status::InProgress).unwrap(), "in_progress");
        assert_eq!(
            Category::expected(),
            "'Structural', 'Civil', 'Geotechnical', 'New Enquiry' or 'Other'"
        );
    }

    #[test]
    fn user_age_bounds() {
        let mut user: User = serde_json::from_str(
            r#"{"name": "A", "email": "a@example.com", "address": "1 Main St", "age": 120}"#,
        )
        .unwrap();
        assert!(user.is_active);
        assert!(user.validate().is_ok());
        user.age = Some(121);
        assert_eq!(user.validate().unwrap_err().fields().collect::<Vec<_>>(), vec!["age"]);
    }

    #[test]
    fn product_price_must_not_be_negative() {
        let mut product = Product {
            title: "Survey".into(),
            description: None,
            price: 0.0,
            category: "services".into(),
            in_stock: true,
        };
        assert!(product.validate().is_ok());
        product.price = -1.0;
        assert!(product.validate().is_err());
        product.price = f64::NAN;
        assert!(product.validate().is_err());
    }
}
