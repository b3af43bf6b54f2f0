//! Concurrent access tests for the finance engine.
//!
//! These tests verify that:
//! - Competing payments against one invoice never double count
//! - Concurrent postings keep the ledger balanced
//! - Document numbers stay unique under contention
//! - Reports taken while posting are internally consistent

#![allow(clippy::cast_possible_truncation)]

use std::collections::HashSet;
use std::sync::Barrier;
use std::thread;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finledger_core::invoice::{InvoiceLineInput, InvoiceStatus, InvoiceType, NewInvoice};
use finledger_core::ledger::{EntryType, PostingInput};
use finledger_core::payment::{NewPayment, PaymentMethod, PaymentStatus, PaymentType};
use finledger_core::{EngineConfig, ErrorKind, FinanceEngine};
use finledger_shared::types::{AccountId, InvoiceId};

const THREADS: usize = 8;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine() -> FinanceEngine {
    FinanceEngine::new(EngineConfig::default()).unwrap()
}

fn account(engine: &FinanceEngine, code: &str) -> AccountId {
    engine.ledger().account_by_code(code).unwrap().id
}

fn sent_invoice(engine: &FinanceEngine, amount: Decimal) -> InvoiceId {
    let invoice = engine
        .create_invoice(
            NewInvoice {
                invoice_type: InvoiceType::Sales,
                counterparty: "CV Sinar".into(),
                issue_date: date(2026, 5, 1),
                due_date: date(2026, 5, 31),
                lines: vec![InvoiceLineInput {
                    description: "Annual licence".into(),
                    quantity: dec!(1),
                    unit_price: amount,
                    discount_percent: Decimal::ZERO,
                    tax_percent: Decimal::ZERO,
                    account_id: None,
                }],
                discount_amount: Decimal::ZERO,
                notes: None,
            },
            None,
        )
        .unwrap();
    engine.send_invoice(invoice.id, None).unwrap();
    invoice.id
}

fn receipt(invoice_id: InvoiceId, amount: Decimal) -> NewPayment {
    NewPayment {
        payment_type: PaymentType::Receipt,
        amount,
        method: PaymentMethod::BankTransfer,
        payment_date: date(2026, 5, 10),
        invoice_id: Some(invoice_id),
        cash_account: None,
        counter_account: None,
        reference: None,
        notes: None,
    }
}

#[test]
fn test_competing_full_payments_settle_once() {
    let engine = engine();
    let invoice_id = sent_invoice(&engine, dec!(1000000));
    let payments: Vec<_> = (0..THREADS)
        .map(|_| {
            engine
                .create_payment(receipt(invoice_id, dec!(1000000)), None)
                .unwrap()
                .id
        })
        .collect();

    let barrier = Barrier::new(THREADS);
    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = payments
            .iter()
            .map(|&id| {
                let engine = &engine;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    engine.confirm_payment(id, None, None)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "exactly one payment may settle the invoice");
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(
                err.kind(),
                ErrorKind::Validation | ErrorKind::InvalidTransition | ErrorKind::ConcurrencyConflict
            ),
            "unexpected error: {err}"
        );
    }

    let invoice = engine.invoice(invoice_id).unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.paid_amount, dec!(1000000));
    assert_eq!(invoice.outstanding_amount, Decimal::ZERO);
    assert_eq!(invoice.payments.len(), 1);

    let confirmed = engine
        .list_payments()
        .unwrap()
        .into_iter()
        .filter(|p| p.status == PaymentStatus::Confirmed)
        .count();
    assert_eq!(confirmed, 1);
    assert_eq!(
        engine
            .account_balance(account(&engine, "1130"), None)
            .unwrap()
            .balance,
        Decimal::ZERO
    );
}

#[test]
fn test_competing_partial_payments_never_exceed_total() {
    let engine = engine();
    let invoice_id = sent_invoice(&engine, dec!(500000));
    // Eight payments of 100,000 against 500,000: five fit.
    let payments: Vec<_> = (0..THREADS)
        .map(|_| {
            engine
                .create_payment(receipt(invoice_id, dec!(100000)), None)
                .unwrap()
                .id
        })
        .collect();

    let barrier = Barrier::new(THREADS);
    thread::scope(|s| {
        for &id in &payments {
            let engine = &engine;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                // Lock contention may surface as a conflict; retry those.
                loop {
                    match engine.confirm_payment(id, None, None) {
                        Err(e) if e.kind() == ErrorKind::ConcurrencyConflict => {}
                        _ => break,
                    }
                }
            });
        }
    });

    let invoice = engine.invoice(invoice_id).unwrap();
    assert_eq!(invoice.paid_amount, dec!(500000));
    assert_eq!(invoice.outstanding_amount, Decimal::ZERO);
    assert_eq!(invoice.payments.len(), 5);
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}

#[test]
fn test_concurrent_postings_stay_balanced() {
    let engine = engine();
    let cash = account(&engine, "1120");
    let capital = account(&engine, "3100");
    let rent = account(&engine, "6200");
    let per_thread = 50;

    thread::scope(|s| {
        for t in 0..THREADS {
            let engine = &engine;
            s.spawn(move || {
                for i in 0..per_thread {
                    let (debit, credit) = if (t + i) % 2 == 0 { (cash, capital) } else { (rent, cash) };
                    engine
                        .post_transaction(PostingInput {
                            account_id: debit,
                            entry_type: EntryType::Debit,
                            amount: dec!(1000),
                            date: date(2026, 6, 1),
                            description: format!("thread {t} posting {i}"),
                            reference: None,
                            contra_account_id: credit,
                        })
                        .unwrap();
                }
            });
        }
    });

    let legs = (THREADS * per_thread * 2) as u64;
    assert_eq!(engine.ledger().high_water_mark(), legs);

    let snapshot = engine.snapshot().unwrap();
    let totals = snapshot.grand_totals();
    assert_eq!(totals.debit, totals.credit);

    let sequences: HashSet<u64> = snapshot.transactions().iter().map(|t| t.sequence).collect();
    assert_eq!(sequences.len() as u64, legs);

    let trial = engine.trial_balance(date(2026, 6, 30)).unwrap();
    assert!(trial.trial_balance.is_balanced);
    let sheet = engine.balance_sheet(date(2026, 6, 30)).unwrap();
    assert!(sheet.is_balanced);
}

#[test]
fn test_reports_during_posting_are_consistent() {
    let engine = engine();
    let cash = account(&engine, "1120");
    let sales = account(&engine, "4100");

    thread::scope(|s| {
        let writer = s.spawn(|| {
            for i in 0..200 {
                engine
                    .post_transaction(PostingInput {
                        account_id: cash,
                        entry_type: EntryType::Debit,
                        amount: dec!(250),
                        date: date(2026, 7, 1),
                        description: format!("cash sale {i}"),
                        reference: None,
                        contra_account_id: sales,
                    })
                    .unwrap();
            }
        });

        for _ in 0..50 {
            let sheet = engine.balance_sheet(date(2026, 7, 31)).unwrap();
            assert!(sheet.is_balanced);
            assert_eq!(sheet.assets.total, sheet.equity.current_year_profit);
        }
        writer.join().unwrap();
    });

    assert_eq!(
        engine.account_balance(cash, None).unwrap().balance,
        dec!(50000)
    );
}

#[test]
fn test_invoice_numbers_unique_under_contention() {
    let engine = engine();
    let numbers: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let engine = &engine;
                s.spawn(move || {
                    (0..10)
                        .map(|_| {
                            let id = sent_invoice(engine, dec!(10));
                            engine.invoice(id).unwrap().number
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<_> = numbers.iter().collect();
    assert_eq!(unique.len(), THREADS * 10);
    assert!(numbers.iter().all(|n| n.starts_with("INV-2026-")));
}
