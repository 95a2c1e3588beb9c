//! Simulated payment.
//!
//! There is no payment provider: a valid form always succeeds after a fixed
//! processing delay. A real shop would replace [`Checkout::advance`] with a
//! call to its payment service.

use crate::error::StoreError;
use std::time::Duration;

pub const PROCESSING_DELAY: Duration = Duration::from_secs(2);
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    #[default]
    Online,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online Payment",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
        }
    }

    pub fn toggled(self) -> PaymentMethod {
        match self {
            PaymentMethod::Online => PaymentMethod::CashOnDelivery,
            PaymentMethod::CashOnDelivery => PaymentMethod::Online,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    CardNumber,
    ExpiryDate,
    Cvv,
    Name,
    Address,
    City,
    ZipCode,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::CardNumber => "Card Number",
            FormField::ExpiryDate => "Expiry Date",
            FormField::Cvv => "CVV",
            FormField::Name => "Full Name",
            FormField::Address => "Address",
            FormField::City => "City",
            FormField::ZipCode => "ZIP Code",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub method: PaymentMethod,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

impl PaymentForm {
    /// Fields shown for the current method, in display order.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = Vec::new();
        if self.method == PaymentMethod::Online {
            fields.extend([FormField::CardNumber, FormField::ExpiryDate, FormField::Cvv]);
        }
        fields.extend([
            FormField::Name,
            FormField::Address,
            FormField::City,
            FormField::ZipCode,
        ]);
        fields
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::CardNumber => &self.card_number,
            FormField::ExpiryDate => &self.expiry_date,
            FormField::Cvv => &self.cvv,
            FormField::Name => &self.name,
            FormField::Address => &self.address,
            FormField::City => &self.city,
            FormField::ZipCode => &self.zip_code,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::CardNumber => &mut self.card_number,
            FormField::ExpiryDate => &mut self.expiry_date,
            FormField::Cvv => &mut self.cvv,
            FormField::Name => &mut self.name,
            FormField::Address => &mut self.address,
            FormField::City => &mut self.city,
            FormField::ZipCode => &mut self.zip_code,
        }
    }

    /// Card fields only count for online payment.
    pub fn is_complete(&self) -> bool {
        self.fields()
            .into_iter()
            .all(|field| !self.value(field).trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckoutPhase {
    Processing { waited: Duration },
    Succeeded { waited: Duration },
    Completed,
}

/// What was bought, kept for the success screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSummary {
    pub total: f64,
    pub item_count: usize,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub phase: CheckoutPhase,
    pub order: OrderSummary,
    pub method: PaymentMethod,
}

impl Checkout {
    pub fn submit(form: &PaymentForm, order: OrderSummary) -> Result<Checkout, StoreError> {
        if !form.is_complete() {
            return Err(StoreError::IncompletePaymentForm);
        }
        Ok(Checkout {
            phase: CheckoutPhase::Processing {
                waited: Duration::ZERO,
            },
            order,
            method: form.method,
        })
    }

    /// Moves the fake flow forward by `dt`. Returns true on the call that
    /// reaches [`CheckoutPhase::Completed`].
    pub fn advance(&mut self, dt: Duration) -> bool {
        match self.phase {
            CheckoutPhase::Processing { waited } => {
                let waited = waited + dt;
                self.phase = if waited >= PROCESSING_DELAY {
                    CheckoutPhase::Succeeded {
                        waited: waited - PROCESSING_DELAY,
                    }
                } else {
                    CheckoutPhase::Processing { waited }
                };
                false
            }
            CheckoutPhase::Succeeded { waited } => {
                let waited = waited + dt;
                if waited >= SUCCESS_DISPLAY {
                    self.phase = CheckoutPhase::Completed;
                    true
                } else {
                    self.phase = CheckoutPhase::Succeeded { waited };
                    false
                }
            }
            CheckoutPhase::Completed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(method: PaymentMethod) -> PaymentForm {
        let mut form = PaymentForm {
            method,
            ..PaymentForm::default()
        };
        for field in form.fields() {
            *form.value_mut(field) = "x".to_string();
        }
        form
    }

    const ORDER: OrderSummary = OrderSummary {
        total: 24.98,
        item_count: 2,
    };

    #[test]
    fn cash_on_delivery_skips_card_fields() {
        let form = filled(PaymentMethod::CashOnDelivery);
        assert!(form.card_number.is_empty());
        assert!(form.is_complete());

        let mut online = form.clone();
        online.method = PaymentMethod::Online;
        assert!(!online.is_complete());
    }

    #[test]
    fn incomplete_form_is_rejected() {
        let mut form = filled(PaymentMethod::Online);
        form.city = "  ".to_string();
        assert_eq!(
            Checkout::submit(&form, ORDER).unwrap_err(),
            StoreError::IncompletePaymentForm
        );
    }

    #[test]
    fn flow_always_completes_after_both_delays() {
        let mut checkout = Checkout::submit(&filled(PaymentMethod::Online), ORDER).unwrap();
        let second = Duration::from_secs(1);

        assert!(!checkout.advance(second));
        assert!(matches!(checkout.phase, CheckoutPhase::Processing { .. }));
        assert!(!checkout.advance(second));
        assert!(matches!(checkout.phase, CheckoutPhase::Succeeded { .. }));
        assert!(!checkout.advance(second));
        assert!(checkout.advance(second));
        assert_eq!(checkout.phase, CheckoutPhase::Completed);
        assert!(!checkout.advance(second));
        assert_eq!(checkout.order, ORDER);
    }
}
