//! `ValidatedJson` extractor: JSON body plus `validator` rules, with every
//! violation reported in one 400 envelope.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use agency_core::error::AppError;
use agency_core::types::response::FieldError;

/// A JSON request body that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value.validate().map_err(|errors| {
            AppError::invalid_fields("Validation failed", field_errors(&errors))
        })?;

        Ok(Self(value))
    }
}

/// A JSON request body whose rules are checked by the service layer.
/// Malformed bodies still produce the standard 400 envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Flattens validation errors, nested structs included, into field errors
/// named the way clients spell them.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            camel_case(field)
        } else {
            format!("{prefix}.{}", camel_case(field))
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{name} is invalid"));
                    out.push(FieldError::new(name.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &name, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{name}[{index}]"), out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "Passenger name is required"))]
        name: String,
    }

    #[derive(Debug, Validate)]
    struct Outer {
        #[validate(range(min = 1, message = "Selling price must be positive"))]
        selling_price: i64,
        #[validate(nested)]
        passenger_info: Inner,
    }

    #[test]
    fn test_all_violations_reported() {
        let body = Outer {
            selling_price: 0,
            passenger_info: Inner {
                name: String::new(),
            },
        };
        let errors = field_errors(&body.validate().unwrap_err());
        assert_eq!(
            errors,
            vec![
                FieldError::new("passengerInfo.name", "Passenger name is required"),
                FieldError::new("sellingPrice", "Selling price must be positive"),
            ]
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("flight_date"), "flightDate");
        assert_eq!(camel_case("status"), "status");
    }
}
