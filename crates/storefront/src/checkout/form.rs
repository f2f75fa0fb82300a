//! Checkout form state and the required-field gate.

use primefix_core::{Email, EmailError, PaymentMethod, UserId};
use thiserror::Error;

/// Reasons a checkout form cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Email address is invalid: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Choose a payment method")]
    MissingPaymentMethod,
}

/// A signed-in customer, used to pre-fill the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// What the customer typed on the checkout page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub payment_method: Option<PaymentMethod>,
    /// Set for signed-in customers, `None` for guest checkout.
    pub user_id: Option<UserId>,
}

impl CheckoutForm {
    /// Form pre-filled with a signed-in customer's name and email.
    #[must_use]
    pub fn for_customer(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            user_id: Some(customer.id),
            ..Self::default()
        }
    }

    /// `"{address}, {city}, {zip}"`, the single-line address the order API stores.
    #[must_use]
    pub fn shipping_address(&self) -> String {
        format!(
            "{}, {}, {}",
            self.address.trim(),
            self.city.trim(),
            self.zip.trim()
        )
    }

    /// Check every required field.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in form order.
    pub fn validate(&self) -> Result<ValidatedForm, FormError> {
        let name = required("Name", &self.name)?;
        let email = Email::parse(required("Email", &self.email)?)?;
        let phone = required("Phone", &self.phone)?;
        required("Address", &self.address)?;
        required("City", &self.city)?;
        required("ZIP code", &self.zip)?;
        let payment_method = self
            .payment_method
            .ok_or(FormError::MissingPaymentMethod)?;

        Ok(ValidatedForm {
            user_id: self.user_id,
            name: name.to_string(),
            email,
            phone: phone.to_string(),
            shipping_address: self.shipping_address(),
            payment_method,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// A form that passed [`CheckoutForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> CheckoutForm {
        CheckoutForm {
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
            address: "1 Navy Way".to_string(),
            city: "Arlington".to_string(),
            zip: "22202".to_string(),
            payment_method: Some(PaymentMethod::CashOnDelivery),
            user_id: None,
        }
    }

    #[test]
    fn test_for_customer_prefills_identity() {
        let customer = Customer {
            id: UserId::new(12),
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
        };
        let form = CheckoutForm::for_customer(&customer);

        assert_eq!(form.name, "Grace Hopper");
        assert_eq!(form.email, "grace@example.com");
        assert_eq!(form.user_id, Some(UserId::new(12)));
        assert!(form.phone.is_empty());
        assert!(form.payment_method.is_none());
    }

    #[test]
    fn test_shipping_address_format() {
        let mut form = filled();
        form.city = "  Arlington ".to_string();
        assert_eq!(form.shipping_address(), "1 Navy Way, Arlington, 22202");
    }

    #[test]
    fn test_validate_complete_form() {
        let validated = filled().validate().unwrap();
        assert_eq!(validated.email.as_str(), "grace@example.com");
        assert_eq!(validated.shipping_address, "1 Navy Way, Arlington, 22202");
        assert_eq!(validated.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(validated.user_id, None);
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let mut form = filled();
        form.phone = "   ".to_string();
        assert_eq!(form.validate(), Err(FormError::MissingField("Phone")));

        let mut form = filled();
        form.zip.clear();
        assert_eq!(form.validate(), Err(FormError::MissingField("ZIP code")));

        let mut form = filled();
        form.payment_method = None;
        assert_eq!(form.validate(), Err(FormError::MissingPaymentMethod));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut form = filled();
        form.email = "grace.example.com".to_string();
        assert!(matches!(form.validate(), Err(FormError::InvalidEmail(_))));
    }
}
