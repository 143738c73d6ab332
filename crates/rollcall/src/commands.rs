// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: direct service calls outside the scan station.

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;
use rollcall_client::{
    filter_enrolled, filter_roster, presence_counts, AttendanceClient, EnrolledStudent, NewStudent,
    StaticCredential,
};
use rollcall_config::RollcallConfig;
use rollcall_core::{
    AccessToken, AttendanceStatus, CredentialProvider, Identity, ParentNumber, RollcallError,
    StudentId, StudentRecord,
};
use tracing::info;

async fn connect(config: &RollcallConfig) -> Result<(AttendanceClient, AccessToken), RollcallError> {
    let client = AttendanceClient::from_config(&config.service)?;
    let token = StaticCredential::from_config(&config.service)
        .access_token()
        .await
        .ok_or(RollcallError::NoCredential)?;
    Ok((client, token))
}

fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

/// `rollcall status <name>`.
pub async fn run_status(config: &RollcallConfig, name: &str) -> Result<(), RollcallError> {
    let identity = Identity::parse(name)?;
    let (client, token) = connect(config).await?;
    let status = client.status(&identity, &token).await?.status();
    println!("{identity}: {}", paint_status(status, use_color()));
    Ok(())
}

/// `rollcall check-in <name>`.
pub async fn run_check_in(config: &RollcallConfig, name: &str) -> Result<(), RollcallError> {
    let identity = Identity::parse(name)?;
    let (client, token) = connect(config).await?;
    client.check_in(&identity, &token).await?;
    info!(identity = %identity, "manual check-in");
    println!("{} {identity} checked in", check_mark(use_color()));
    Ok(())
}

/// `rollcall check-out <name>`.
pub async fn run_check_out(config: &RollcallConfig, name: &str) -> Result<(), RollcallError> {
    let identity = Identity::parse(name)?;
    let (client, token) = connect(config).await?;
    client.check_out(&identity, &token).await?;
    info!(identity = %identity, "manual check-out");
    println!("{} {identity} checked out", check_mark(use_color()));
    Ok(())
}

/// `rollcall roster [--search <q>]`.
pub async fn run_roster(config: &RollcallConfig, search: Option<&str>) -> Result<(), RollcallError> {
    let (client, token) = connect(config).await?;
    let students = client.list_students(&token).await?;
    let shown = filter_roster(&students, search.unwrap_or_default());
    print!("{}", format_roster(&shown, presence_counts(&students), use_color()));
    Ok(())
}

/// `rollcall notify <name>`.
pub async fn run_notify(config: &RollcallConfig, name: &str) -> Result<(), RollcallError> {
    let identity = Identity::parse(name)?;
    let (client, token) = connect(config).await?;
    if client.notify_parent(&identity, &token).await? {
        println!("{} message sent to the parents of {identity}", check_mark(use_color()));
    } else {
        println!("message to the parents of {identity} was not sent");
    }
    Ok(())
}

/// `rollcall finish-day`.
pub async fn run_finish_day(config: &RollcallConfig) -> Result<(), RollcallError> {
    let (client, token) = connect(config).await?;
    client.finish_day(&token).await?;
    println!("{} day closed, report sent", check_mark(use_color()));
    Ok(())
}

/// `rollcall students [--search <q>]`.
pub async fn run_students(config: &RollcallConfig, search: Option<&str>) -> Result<(), RollcallError> {
    let (client, token) = connect(config).await?;
    let students = client.list_all_students(&token).await?;
    let shown = filter_enrolled(&students, search.unwrap_or_default());
    print!("{}", format_enrolment(&shown));
    Ok(())
}

/// `rollcall add-student <name> <parent-number>`.
pub async fn run_add_student(
    config: &RollcallConfig,
    name: &str,
    parent_number: &str,
) -> Result<(), RollcallError> {
    let student = NewStudent::new(name, parent_number)?;
    let (client, token) = connect(config).await?;
    client.add_students(std::slice::from_ref(&student), &token).await?;
    println!("{} {} enrolled", check_mark(use_color()), student.name);
    Ok(())
}

/// `rollcall set-parent <id> <parent-number>`.
pub async fn run_set_parent(
    config: &RollcallConfig,
    id: &StudentId,
    parent_number: &str,
) -> Result<(), RollcallError> {
    let parent_number = ParentNumber::parse(parent_number)?;
    let (client, token) = connect(config).await?;
    // The update carries the parent link, which only the enrolment list knows.
    let students = client.list_all_students(&token).await?;
    let student = students
        .iter()
        .find(|s| &s.id == id)
        .ok_or_else(|| RollcallError::InvalidInput(format!("no enrolled student with id {id}")))?;
    client
        .update_parent_number(student, &parent_number, &token)
        .await?;
    println!(
        "{} parent number of {} set to {parent_number}",
        check_mark(use_color()),
        student.name
    );
    Ok(())
}

/// `rollcall remove-student <id> --yes`.
pub async fn run_remove_student(
    config: &RollcallConfig,
    id: &StudentId,
    confirmed: bool,
) -> Result<(), RollcallError> {
    if !confirmed {
        return Err(RollcallError::InvalidInput(format!(
            "refusing to delete student {id} without --yes"
        )));
    }
    let (client, token) = connect(config).await?;
    let message = client.delete_student(id, &token).await?;
    println!(
        "{} {}",
        check_mark(use_color()),
        message.unwrap_or_else(|| format!("student {id} deleted"))
    );
    Ok(())
}

/// `rollcall upload-csv <path>`.
pub async fn run_upload_csv(config: &RollcallConfig, path: &Path) -> Result<(), RollcallError> {
    let contents = tokio::fs::read(path).await.map_err(|e| {
        RollcallError::InvalidInput(format!("cannot read {}: {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "students.csv".to_string());
    let (client, token) = connect(config).await?;
    client.upload_csv(&file_name, contents, &token).await?;
    println!("{} {file_name} uploaded", check_mark(use_color()));
    Ok(())
}

/// `rollcall config`: the effective configuration, token redacted.
pub fn run_config(config: &RollcallConfig) -> Result<(), RollcallError> {
    let rendered = toml::to_string_pretty(&config.redacted())
        .map_err(|e| RollcallError::Config(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

pub(crate) fn check_mark(use_color: bool) -> String {
    if use_color {
        "✓".green().to_string()
    } else {
        "[OK]".to_string()
    }
}

fn paint_status(status: AttendanceStatus, use_color: bool) -> String {
    let label = status.to_string();
    if !use_color {
        return label;
    }
    match status {
        AttendanceStatus::CheckedIn => label.green().to_string(),
        AttendanceStatus::CheckedOut => label.yellow().to_string(),
        AttendanceStatus::NotFound => label.dimmed().to_string(),
    }
}

/// Roster table followed by the day's presence summary.
pub(crate) fn format_roster(
    students: &[&StudentRecord],
    (checked_in, checked_out): (usize, usize),
    use_color: bool,
) -> String {
    let width = students
        .iter()
        .map(|s| s.student_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = String::new();
    out.push_str(&format!("  {:<width$}  {:<11}  NOTIFIED\n", "NAME", "STATUS"));
    out.push_str(&format!("  {}\n", "-".repeat(width + 23)));
    for student in students {
        let status = paint_status(student.status.into(), use_color);
        // Pad before painting so escape codes do not skew the columns.
        let pad = " ".repeat(11usize.saturating_sub(student.status.to_string().len()));
        let notified = if student.parent_notified { "yes" } else { "" };
        out.push_str(&format!(
            "  {:<width$}  {status}{pad}  {notified}\n",
            student.student_name
        ));
    }
    out.push_str(&format!(
        "\n  {checked_in} checked in, {checked_out} checked out\n"
    ));
    out
}

/// Enrolment table: id, name, and parent number.
pub(crate) fn format_enrolment(students: &[&EnrolledStudent]) -> String {
    let ids: Vec<String> = students.iter().map(|s| s.id.to_string()).collect();
    let id_width = ids.iter().map(String::len).max().unwrap_or(0).max("ID".len());
    let name_width = students
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = String::new();
    out.push_str(&format!("  {:<id_width$}  {:<name_width$}  PARENT\n", "ID", "NAME"));
    out.push_str(&format!("  {}\n", "-".repeat(id_width + name_width + 12)));
    for (student, id) in students.iter().zip(&ids) {
        out.push_str(&format!(
            "  {id:<id_width$}  {:<name_width$}  {}\n",
            student.name,
            student.phone_number().unwrap_or("-")
        ));
    }
    out.push_str(&format!("\n  {} enrolled\n", students.len()));
    out
}

pub(crate) fn summary_line(students: &[StudentRecord]) -> String {
    let (checked_in, checked_out) = presence_counts(students);
    format!("Roster: {checked_in} checked in, {checked_out} checked out")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::RecordStatus;

    fn record(name: &str, status: RecordStatus, notified: bool) -> StudentRecord {
        StudentRecord {
            id: None,
            student_name: name.to_string(),
            status,
            parent_notified: notified,
        }
    }

    #[test]
    fn roster_table_aligns_columns() {
        let students = [
            record("ONA NEO", RecordStatus::CheckedIn, false),
            record("TARA DESITA CHIA", RecordStatus::CheckedOut, true),
        ];
        let refs: Vec<&StudentRecord> = students.iter().collect();
        let table = format_roster(&refs, presence_counts(&students), false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "  NAME              STATUS       NOTIFIED");
        assert_eq!(lines[2], "  ONA NEO           checked_in   ");
        assert_eq!(lines[3], "  TARA DESITA CHIA  checked_out  yes");
        assert!(table.ends_with("1 checked in, 1 checked out\n"));
    }

    #[test]
    fn plain_check_mark_has_no_escape_codes() {
        assert_eq!(check_mark(false), "[OK]");
    }

    #[test]
    fn summary_counts_presence() {
        let students = [
            record("A", RecordStatus::CheckedIn, false),
            record("B", RecordStatus::CheckedIn, false),
            record("C", RecordStatus::CheckedOut, false),
        ];
        assert_eq!(summary_line(&students), "Roster: 2 checked in, 1 checked out");
    }

    #[test]
    fn config_output_redacts_token() {
        let mut config = RollcallConfig::default();
        config.service.access_token = Some("eyJhbGciOi".into());
        let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("eyJhbGciOi"));
    }

    fn config_for(base_url: &str) -> RollcallConfig {
        let mut config = RollcallConfig::default();
        config.service.base_url = base_url.to_string();
        config.service.access_token = Some("test-token".into());
        config
    }

    #[test]
    fn enrolment_table_shows_missing_numbers() {
        let students: Vec<EnrolledStudent> = serde_json::from_value(serde_json::json!([
            {"id": 3, "name": "ONA NEO", "parents": {"phone_number": 91234567}},
            {"id": 12, "name": "WANG YOU"}
        ]))
        .unwrap();
        let refs: Vec<&EnrolledStudent> = students.iter().collect();
        let table = format_enrolment(&refs);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "  ID  NAME      PARENT");
        assert_eq!(lines[2], "  3   ONA NEO   91234567");
        assert_eq!(lines[3], "  12  WANG YOU  -");
        assert!(table.ends_with("2 enrolled\n"));
    }

    #[tokio::test]
    async fn add_student_rejects_short_number_before_connecting() {
        // No access token: a request attempt would fail with NoCredential instead.
        let err = run_add_student(&RollcallConfig::default(), "CAELYN TEO", "9123456")
            .await
            .unwrap_err();
        assert!(matches!(err, RollcallError::InvalidInput(_)), "got: {err}");
    }

    #[tokio::test]
    async fn remove_student_requires_confirmation() {
        let err = run_remove_student(&RollcallConfig::default(), &StudentId::Number(7), false)
            .await
            .unwrap_err();
        assert!(err.user_message().contains("--yes"));
    }

    #[tokio::test]
    async fn set_parent_resolves_parent_link_from_enrolment() {
        use wiremock::matchers::{body_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/all-students"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "students": [{"id": 3, "name": "ONA NEO", "parent_id": 11}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/update-student"))
            .and(body_json(serde_json::json!({
                "id": 3,
                "parent_id": 11,
                "name": "ONA NEO",
                "parent_number": "87654321"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        run_set_parent(&config_for(&server.uri()), &StudentId::Number(3), "87654321")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn set_parent_unknown_id_sends_no_update() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/all-students"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"students": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/update-student"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = run_set_parent(&config_for(&server.uri()), &StudentId::Number(9), "87654321")
            .await
            .unwrap_err();
        assert!(err.user_message().contains("no enrolled student with id 9"));
    }

    #[tokio::test]
    async fn upload_csv_sends_file_name_from_path() {
        use std::io::Write;
        use wiremock::matchers::{body_string_contains, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-csv"))
            .and(body_string_contains("filename=\"term3.csv\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("term3.csv");
        let mut file = std::fs::File::create(&csv).unwrap();
        writeln!(file, "name,parentNumber\nONA NEO,91234567").unwrap();

        run_upload_csv(&config_for(&server.uri()), &csv).await.unwrap();
    }
}
