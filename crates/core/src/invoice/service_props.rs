//! Property-based tests for invoice payment and overdue rules.

use chrono::{Duration, NaiveDate};
use finledger_shared::types::{Currency, PaymentId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::InvoiceService;
use super::types::{Invoice, InvoiceLineInput, InvoiceStatus, InvoiceType, NewInvoice};

fn line() -> impl Strategy<Value = InvoiceLineInput> {
    (1i64..100, 0i64..10_000_000, 0i64..=100, 0i64..=20).prop_map(|(qty, cents, discount, tax)| {
        InvoiceLineInput {
            description: "item".into(),
            quantity: Decimal::from(qty),
            unit_price: Decimal::new(cents, 2),
            discount_percent: Decimal::from(discount),
            tax_percent: Decimal::from(tax),
            account_id: None,
        }
    })
}

fn sent_invoice(lines: Vec<InvoiceLineInput>) -> Invoice {
    let issue = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let mut invoice = InvoiceService::create(
        NewInvoice {
            invoice_type: InvoiceType::Sales,
            counterparty: "Customer".into(),
            issue_date: issue,
            due_date: issue + Duration::days(30),
            lines,
            discount_amount: Decimal::ZERO,
            notes: None,
        },
        "INV-2026-0001".into(),
        None,
        Currency::Idr,
    )
    .unwrap();
    InvoiceService::send(&mut invoice).unwrap();
    invoice
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Outstanding always equals total minus paid and never goes negative,
    /// whatever sequence of payments is attempted.
    #[test]
    fn prop_outstanding_invariant(
        lines in prop::collection::vec(line(), 1..5),
        payments in prop::collection::vec(-1_000i64..500_000_000, 0..10),
    ) {
        let mut invoice = sent_invoice(lines);
        for cents in payments {
            let _ = InvoiceService::apply_payment(&mut invoice, PaymentId::new(), Decimal::new(cents, 2));
            prop_assert_eq!(invoice.outstanding_amount, invoice.total_amount - invoice.paid_amount);
            prop_assert!(invoice.outstanding_amount >= Decimal::ZERO);
            if invoice.status == InvoiceStatus::Paid {
                prop_assert_eq!(invoice.outstanding_amount, Decimal::ZERO);
            }
        }
    }

    /// Total is subtotal minus header discount plus tax.
    #[test]
    fn prop_total_formula(lines in prop::collection::vec(line(), 1..5)) {
        let invoice = sent_invoice(lines);
        let subtotal: Decimal = invoice.lines.iter().map(|l| l.subtotal).sum();
        let tax: Decimal = invoice.lines.iter().map(|l| l.tax_amount).sum();
        prop_assert_eq!(invoice.total_amount, subtotal - invoice.discount_amount + tax);
    }

    /// Deriving the overdue status is idempotent and never mutates the invoice.
    #[test]
    fn prop_overdue_idempotent(
        lines in prop::collection::vec(line(), 1..3),
        offset in -60i64..120,
    ) {
        let invoice = sent_invoice(lines);
        let before = invoice.status;
        let today = invoice.due_date + Duration::days(offset);

        let first = InvoiceService::derive_overdue_status(&invoice, today);
        let second = InvoiceService::derive_overdue_status(&invoice, today);
        prop_assert_eq!(first, second);
        prop_assert_eq!(invoice.status, before);
        prop_assert_eq!(first == InvoiceStatus::Overdue, offset > 0);
    }
}
