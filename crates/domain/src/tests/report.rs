// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::date;
use crate::{
    AmountInput, DomainError, Money, PhotoFormat, ReportDraft, ReportValidationErrors,
    ValidatedReport, format_report_date, parse_report_date, validate_photo, validate_report_draft,
};
use time::{Date, Month};

fn today() -> Date {
    date(2026, Month::March, 14)
}

fn complete_draft() -> ReportDraft {
    ReportDraft {
        branch_id: Some(3),
        report_date: Some(String::from("2026-03-14")),
        cash_sales: Some(AmountInput::Text(String::from("1000"))),
        credit_card_sales: Some(AmountInput::Text(String::from("250,50"))),
        debit_card_sales: Some(AmountInput::Kurus(4_999)),
        notes: Some(String::from("  kasa sayımı tamam  ")),
    }
}

fn messages<'a>(errors: &'a ReportValidationErrors, field: &str) -> Vec<&'a str> {
    errors
        .field_errors
        .get(field)
        .map(|m| m.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

#[test]
fn test_total_is_sum_of_channels() {
    let report: ValidatedReport = validate_report_draft(&complete_draft(), today()).unwrap();
    assert_eq!(report.branch_id, 3);
    assert_eq!(report.report_date, today());
    assert_eq!(report.total_sales, Money::from_kurus(130_049));
    assert_eq!(report.total_sales, report.sales.total().unwrap());
    assert_eq!(report.notes.as_deref(), Some("kasa sayımı tamam"));
}

#[test]
fn test_missing_amounts_default_to_zero() {
    let draft: ReportDraft = ReportDraft {
        branch_id: Some(1),
        report_date: Some(String::from("2026-03-01")),
        cash_sales: Some(AmountInput::Text(String::from("500"))),
        credit_card_sales: None,
        debit_card_sales: Some(AmountInput::Text(String::from("   "))),
        notes: Some(String::from("   ")),
    };
    let report: ValidatedReport = validate_report_draft(&draft, today()).unwrap();
    assert_eq!(report.total_sales, Money::from_kurus(50_000));
    assert_eq!(report.sales.credit_card, Money::ZERO);
    assert!(report.notes.is_none());
}

#[test]
fn test_branch_and_date_are_required() {
    let draft: ReportDraft = ReportDraft::default();
    let errors: ReportValidationErrors = validate_report_draft(&draft, today()).unwrap_err();
    assert_eq!(messages(&errors, "branch_id"), vec!["Şube seçimi zorunludur."]);
    assert_eq!(messages(&errors, "report_date"), vec!["Tarih gereklidir."]);
}

#[test]
fn test_future_date_is_rejected() {
    let mut draft: ReportDraft = complete_draft();
    draft.report_date = Some(String::from("2026-03-15"));
    let errors: ReportValidationErrors = validate_report_draft(&draft, today()).unwrap_err();
    assert_eq!(
        messages(&errors, "report_date"),
        vec!["Gelecek tarihli rapor girilemez."]
    );
}

#[test]
fn test_negative_amounts_report_per_field() {
    let mut draft: ReportDraft = complete_draft();
    draft.cash_sales = Some(AmountInput::Text(String::from("-1")));
    draft.credit_card_sales = Some(AmountInput::Kurus(-100));
    draft.debit_card_sales = Some(AmountInput::Text(String::from("-0,01")));

    let errors: ReportValidationErrors = validate_report_draft(&draft, today()).unwrap_err();
    assert_eq!(
        messages(&errors, "cash_sales"),
        vec!["Nakit satış 0 dan küçük olamaz."]
    );
    assert_eq!(
        messages(&errors, "credit_card_sales"),
        vec!["Kredi kartı satış 0 dan küçük olamaz."]
    );
    assert_eq!(
        messages(&errors, "debit_card_sales"),
        vec!["Banka kartı satış 0 dan küçük olamaz."]
    );
    assert!(messages(&errors, "branch_id").is_empty());
}

#[test]
fn test_malformed_amount_is_a_field_error() {
    let mut draft: ReportDraft = complete_draft();
    draft.cash_sales = Some(AmountInput::Text(String::from("bin lira")));
    let errors: ReportValidationErrors = validate_report_draft(&draft, today()).unwrap_err();
    assert_eq!(messages(&errors, "cash_sales"), vec!["Geçerli bir tutar giriniz."]);
}

#[test]
fn test_report_date_format() {
    let parsed: Date = parse_report_date("2026-01-05").unwrap();
    assert_eq!(parsed, date(2026, Month::January, 5));
    assert_eq!(format_report_date(parsed), "2026-01-05");
    assert!(matches!(
        parse_report_date("05.01.2026"),
        Err(DomainError::DateParseError { .. })
    ));
}

#[test]
fn test_photo_limits() {
    assert_eq!(validate_photo(1024, "image/png").unwrap(), PhotoFormat::Png);
    assert_eq!(validate_photo(5_000_000, "image/jpeg").unwrap(), PhotoFormat::Jpeg);
    assert_eq!(
        validate_photo(5_000_001, "image/jpeg"),
        Err(DomainError::InvalidPhoto(String::from(
            "Dosya boyutu 5MB dan küçük olmalı."
        )))
    );
    assert_eq!(
        validate_photo(10, "application/pdf"),
        Err(DomainError::InvalidPhoto(String::from(
            "Sadece .jpg, .jpeg, .png ve .webp formatları kabul edilir."
        )))
    );
}

#[test]
fn test_photo_extension_round_trip() {
    for format in [PhotoFormat::Jpeg, PhotoFormat::Png, PhotoFormat::Webp] {
        assert_eq!(PhotoFormat::from_extension(format.extension()), Some(format));
    }
    assert_eq!(PhotoFormat::from_extension("gif"), None);
}
