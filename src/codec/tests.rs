//! Codec tests

use super::*;
use crate::models::{
    BranchPattern, CustomDeploymentRule, DeploymentBranchPolicy, Environment, EnvironmentRecord,
    Repository, Reviewer, ReviewerKind, SecretMetadata, SecretRecord, Variable, VariableRecord,
};
use chrono::{TimeZone, Utc};

fn reviewers(n: usize) -> Vec<Reviewer> {
    (0..n)
        .map(|i| Reviewer {
            kind: if i % 2 == 0 {
                ReviewerKind::User
            } else {
                ReviewerKind::Team
            },
            login: format!("reviewer-{i}"),
            id: 1000 + i as u64,
        })
        .collect()
}

fn branches(m: usize) -> Vec<BranchPattern> {
    (0..m)
        .map(|i| {
            if i == 2 {
                BranchPattern::tag(format!("v{i}.*"))
            } else {
                BranchPattern::branch(format!("release/{i}"))
            }
        })
        .collect()
}

fn record(environment: Environment) -> EnvironmentRecord {
    EnvironmentRecord {
        repository: Repository::new(42, "api"),
        environment,
        secrets_total: 3,
        variables_total: 5,
    }
}

#[test]
fn test_reviewers_and_branches_round_trip() {
    for n in [0, 1, 3] {
        for m in [0, 1, 3] {
            let env = Environment {
                name: "production".to_string(),
                reviewers: reviewers(n),
                branch_policy: DeploymentBranchPolicy::CustomBranches,
                branches: branches(m),
                ..Environment::default()
            };

            let row = StringRecord::from(encode_environment_record(&record(env.clone())));
            let decoded = decode_environment_row(&row).expect("decode");

            assert_eq!(decoded.environment.reviewers, env.reviewers, "n={n} m={m}");
            assert_eq!(decoded.environment.branches, env.branches, "n={n} m={m}");
        }
    }
}

#[test]
fn test_full_record_round_trip() {
    let env = Environment {
        name: "staging".to_string(),
        admin_bypass: true,
        wait_timer: 30,
        prevent_self_review: true,
        reviewers: reviewers(2),
        branch_policy: DeploymentBranchPolicy::ProtectedBranches,
        branches: vec![],
        custom_rules: vec![CustomDeploymentRule {
            policy_id: 9,
            enabled: true,
            integration_id: 77,
            slug: "datadog".to_string(),
        }],
    };

    let decoded =
        decode_environment_row(&StringRecord::from(encode_environment_record(&record(env.clone()))))
            .unwrap();

    assert_eq!(decoded.repository_name, "api");
    assert_eq!(decoded.repository_id, 42);
    assert_eq!(decoded.environment, env);
}

#[test]
fn test_encode_export_columns() {
    let env = Environment {
        name: "prod".to_string(),
        wait_timer: 10,
        reviewers: vec![
            Reviewer {
                kind: ReviewerKind::Team,
                login: "ops".to_string(),
                id: 1,
            },
            Reviewer {
                kind: ReviewerKind::User,
                login: "alice".to_string(),
                id: 2,
            },
        ],
        branch_policy: DeploymentBranchPolicy::CustomBranches,
        branches: vec![BranchPattern::branch("main"), BranchPattern::tag("v*")],
        ..Environment::default()
    };

    let columns = encode_environment_record(&record(env));

    assert_eq!(columns.len(), ENVIRONMENT_EXPORT_HEADER.len());
    assert_eq!(columns[5], "Team;ops;1|User;alice;2");
    assert_eq!(columns[7], "custom");
    assert_eq!(columns[8], "main;branch|v*;tag");
    assert_eq!(columns[9], "");
    assert_eq!(columns[10], "3");
    assert_eq!(columns[11], "5");
}

#[test]
fn test_empty_collections_encode_as_empty_cells() {
    let columns = encode_environment_record(&record(Environment::named("dev")));
    assert_eq!(columns[5], "");
    assert_eq!(columns[7], "");
    assert_eq!(columns[8], "");
    assert_eq!(columns[9], "");
}

#[test]
fn test_malformed_reviewer_is_skipped() {
    let decoded: Vec<Reviewer> = decode_items("Team;alice;1|garbage", "test");

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].login, "alice");
    assert_eq!(decoded[0].kind, ReviewerKind::Team);
}

#[test]
fn test_reviewer_with_bad_id_or_type_is_skipped() {
    let decoded: Vec<Reviewer> = decode_items("User;bob;x|Robot;eve;3|User;carol;4", "test");

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].login, "carol");
}

#[test]
fn test_branch_with_wrong_arity_is_skipped() {
    let decoded: Vec<BranchPattern> = decode_items("main;branch|feature|v1;tag;extra", "test");
    assert_eq!(decoded, vec![BranchPattern::branch("main")]);
}

fn import_row(cells: &[&str]) -> StringRecord {
    StringRecord::from(cells.to_vec())
}

#[test]
fn test_decode_import_layout() {
    let row = import_row(&[
        "api",
        "42",
        "prod",
        "false",
        "",
        "User;alice;7",
        "true",
        "protected",
        "",
        "1;true;2;approver",
    ]);

    let decoded = decode_environment_row(&row).unwrap();

    assert_eq!(decoded.environment.wait_timer, 0);
    assert!(decoded.environment.prevent_self_review);
    assert_eq!(
        decoded.environment.branch_policy,
        DeploymentBranchPolicy::ProtectedBranches
    );
    assert_eq!(decoded.environment.custom_rules.len(), 1);
    assert_eq!(decoded.environment.custom_rules[0].slug, "approver");
}

#[test]
fn test_decode_legacy_layout_without_custom_rules_column() {
    let row = import_row(&["api", "42", "prod", "true", "5", "", "false", "", ""]);

    let decoded = decode_environment_row(&row).unwrap();

    assert!(decoded.environment.admin_bypass);
    assert_eq!(decoded.environment.wait_timer, 5);
    assert!(decoded.environment.custom_rules.is_empty());
}

#[test]
fn test_bad_repository_id_is_malformed() {
    let row = import_row(&["api", "abc", "prod", "", "", "", "", "", "", ""]);

    let err = decode_environment_row(&row).unwrap_err();

    match err {
        Error::MalformedRow { column, value, .. } => {
            assert_eq!(column, "RepositoryID");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_bad_wait_timer_is_malformed() {
    let row = import_row(&["api", "1", "prod", "", "soon", "", "", "", "", ""]);
    assert!(matches!(
        decode_environment_row(&row),
        Err(Error::MalformedRow {
            column: "WaitTimer",
            ..
        })
    ));
}

#[test]
fn test_booleans_are_strict() {
    let row = import_row(&["api", "1", "prod", "yes", "", "", "", "", "", ""]);
    assert!(matches!(
        decode_environment_row(&row),
        Err(Error::MalformedRow {
            column: "AdminBypass",
            ..
        })
    ));
}

#[test]
fn test_unknown_branch_policy_is_malformed() {
    let row = import_row(&["api", "1", "prod", "", "", "", "", "everything", "", ""]);
    assert!(matches!(
        decode_environment_row(&row),
        Err(Error::MalformedRow {
            column: "BranchPolicyType",
            ..
        })
    ));
}

#[test]
fn test_short_row_is_malformed() {
    let row = import_row(&["api", "1", "prod"]);
    assert!(matches!(
        decode_environment_row(&row),
        Err(Error::MalformedRow { .. })
    ));
}

#[test]
fn test_read_rows_skips_header_and_keeps_line_numbers() {
    let data = "RepositoryID,RepositoryName,EnvironmentName,Name,Value\n\
                1,api,prod,TOKEN,abc\n\
                x,api,prod,OTHER,def\n";

    let rows = read_rows(data.as_bytes()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].line, 2);

    let first = decode_scoped_row(rows[0].record.as_ref().unwrap()).unwrap();
    assert_eq!(first.repository_id, 1);
    assert_eq!(first.name, "TOKEN");
    assert_eq!(first.value, "abc");

    match decode_scoped_row(rows[1].record.as_ref().unwrap()).unwrap_err() {
        Error::MalformedRow { line, column, .. } => {
            assert_eq!(line, 3);
            assert_eq!(column, "RepositoryID");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_invalid_utf8_row_fails_alone() {
    let mut data = b"RepositoryID,RepositoryName,EnvironmentName,Name,Value\n\
                     1,api,prod,GOOD_A,a\n"
        .to_vec();
    data.extend_from_slice(b"1,api,prod,BAD,\xff\xfe\n");
    data.extend_from_slice(b"1,api,prod,GOOD_B,b\n");

    let rows = read_rows(data.as_slice()).unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows[0].record.is_ok());
    match &rows[1].record {
        Err(Error::InvalidEncoding { line, field }) => {
            assert_eq!(*line, 3);
            assert_eq!(*field, 5);
        }
        other => panic!("unexpected row {other:?}"),
    }
    assert_eq!(rows[1].line, 3);
    let last = decode_scoped_row(rows[2].record.as_ref().unwrap()).unwrap();
    assert_eq!(last.name, "GOOD_B");
}

#[test]
fn test_scoped_value_may_be_empty_but_name_may_not() {
    let ok = decode_scoped_row(&import_row(&["1", "api", "prod", "EMPTY", ""])).unwrap();
    assert_eq!(ok.value, "");

    assert!(decode_scoped_row(&import_row(&["1", "api", "prod", " ", "v"])).is_err());
}

#[test]
fn test_variable_export_uses_rfc3339() {
    let record = VariableRecord {
        repository_id: 7,
        repository_name: "api".to_string(),
        environment: "prod".to_string(),
        variable: Variable {
            name: "REGION".to_string(),
            value: "eu-west-1".to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            updated_at: None,
        },
    };

    let columns = encode_variable_record(&record);

    assert_eq!(columns.len(), VARIABLE_EXPORT_HEADER.len());
    assert_eq!(columns[5], "2024-01-02T03:04:05Z");
    assert_eq!(columns[6], "");
}

#[test]
fn test_secret_export_has_no_value_column() {
    let record = SecretRecord {
        repository_id: 7,
        repository_name: "api".to_string(),
        environment: "prod".to_string(),
        secret: SecretMetadata {
            name: "TOKEN".to_string(),
            created_at: None,
            updated_at: None,
        },
    };

    let columns = encode_secret_record(&record);

    assert_eq!(columns.len(), SECRET_EXPORT_HEADER.len());
    assert_eq!(columns[3], "TOKEN");
}

#[test]
fn test_writer_with_header() {
    let mut writer = writer_with_header(Vec::new(), &SCOPED_IMPORT_HEADER).unwrap();
    writer.write_record(["1", "api", "prod", "A", "b;c|d"]).unwrap();
    let Ok(bytes) = writer.into_inner() else {
        panic!("writer failed to flush");
    };

    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(
        text,
        "RepositoryID,RepositoryName,EnvironmentName,Name,Value\n1,api,prod,A,b;c|d\n"
    );
}
