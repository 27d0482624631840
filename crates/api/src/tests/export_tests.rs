// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Month};

use super::helpers::{TestEnv, submission};
use crate::{
    AuthenticatedUser, EXPORT_HEADERS, ExportReportsRequest, ExportReportsResponse,
    SubmitReportRequest, create_report, export_filename, export_reports, format_display_date,
};

fn parse_rows(content: &str) -> Vec<Vec<String>> {
    let mut reader: csv::Reader<&[u8]> = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(content.as_bytes());
    reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn submit(env: &mut TestEnv, user_id: i64, request: &SubmitReportRequest) {
    let user: AuthenticatedUser = env.as_user(user_id);
    create_report(
        &mut env.persistence,
        &env.photos,
        &env.clock,
        &user,
        request,
        None,
    )
    .unwrap();
}

#[test]
fn test_format_display_date() {
    assert_eq!(format_display_date("2026-03-05"), "05.03.2026");
    assert_eq!(format_display_date("dün"), "dün");
}

#[test]
fn test_export_filename() {
    let today: Date = Date::from_calendar_date(2026, Month::July, 9).unwrap();
    assert_eq!(export_filename(today), "z-raporlari-2026-07-09.csv");
}

#[test]
fn test_export_rows_and_totals() {
    let mut env: TestEnv = TestEnv::new();
    let (admin, bodrum, cesme) = (env.admin, env.bodrum, env.cesme);
    let mut first: SubmitReportRequest = submission(bodrum, &env.day(-1), 1_234, 0, 10);
    first.notes = Some(String::from("Kasa, eksiksiz"));
    let second: SubmitReportRequest = submission(cesme, &env.day(0), 100, 50, 0);
    submit(&mut env, admin, &first);
    submit(&mut env, admin, &second);

    let user: AuthenticatedUser = env.as_user(admin);
    let request: ExportReportsRequest = ExportReportsRequest {
        totals: true,
        ..ExportReportsRequest::default()
    };
    let response: ExportReportsResponse =
        export_reports(&mut env.persistence, &env.clock, &user, &request).unwrap();

    assert_eq!(response.row_count, 2);
    assert!(response.filename.starts_with("z-raporlari-"));

    let rows: Vec<Vec<String>> = parse_rows(&response.content);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], EXPORT_HEADERS.map(String::from).to_vec());

    // Newest first
    assert_eq!(rows[1][1], "Çeşme");
    assert_eq!(rows[1][6], "150,00 ₺");
    assert_eq!(rows[1][8], "Hayır");
    assert_eq!(rows[2][1], "Bodrum");
    assert_eq!(rows[2][3], "1.234,00 ₺");
    assert_eq!(rows[2][7], "Kasa, eksiksiz");

    assert_eq!(rows[3][0], "TOPLAM");
    assert_eq!(rows[3][3], "1.334,00 ₺");
    assert_eq!(rows[3][6], "1.394,00 ₺");
}

#[test]
fn test_export_respects_visibility_and_filters() {
    let mut env: TestEnv = TestEnv::new();
    let (admin, manager, bodrum, cesme) = (env.admin, env.manager, env.bodrum, env.cesme);
    let requests: Vec<SubmitReportRequest> = vec![
        submission(bodrum, &env.day(-3), 100, 0, 0),
        submission(bodrum, &env.day(0), 100, 0, 0),
        submission(cesme, &env.day(0), 100, 0, 0),
    ];
    for request in &requests {
        submit(&mut env, admin, request);
    }

    let user: AuthenticatedUser = env.as_user(manager);
    let request: ExportReportsRequest = ExportReportsRequest {
        date_from: Some(env.day(-1)),
        ..ExportReportsRequest::default()
    };
    let response: ExportReportsResponse =
        export_reports(&mut env.persistence, &env.clock, &user, &request).unwrap();

    assert_eq!(response.row_count, 1);
    let rows: Vec<Vec<String>> = parse_rows(&response.content);
    assert_eq!(rows[1][1], "Bodrum");
}

#[test]
fn test_empty_export_has_only_headers() {
    let mut env: TestEnv = TestEnv::new();
    let user: AuthenticatedUser = env.as_user(env.staff);

    let response: ExportReportsResponse = export_reports(
        &mut env.persistence,
        &env.clock,
        &user,
        &ExportReportsRequest::default(),
    )
    .unwrap();

    assert_eq!(response.row_count, 0);
    assert_eq!(parse_rows(&response.content).len(), 1);
}
