//! # MongoDB Instance Connection Tests
//!
//! End-to-end behaviour of the self-managed MongoDB backend through the
//! public API.

mod common;

use common::*;
use render_db_connection::graph::GrantTarget;
use render_db_connection::prelude::*;

fn script_assets(ctx: &BuildContext) -> usize {
    ctx.graph()
        .resources()
        .filter(|r| matches!(r.kind, ResourceKind::ScriptAsset { .. }))
        .count()
}

#[test]
fn test_no_diagnostics_on_creation() {
    let mut ctx = BuildContext::default();
    mongo(&mut ctx, false);
    assert!(ctx.diagnostics().is_empty());
}

#[test]
fn test_container_environment_holds_certificate_arns() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, false);
    let env = connection.container_environment();
    assert_eq!(env.len(), 2);
    assert_eq!(env.get("DB_TLS_CLIENT_CERT_URI").map(String::as_str), Some(CERT_ARN));
    assert_eq!(
        env.get("DB_TLS_CLIENT_CERT_PASSWORD_URI").map(String::as_str),
        Some(CERT_PASSPHRASE_ARN)
    );
}

#[test]
fn test_non_linux_hosts_rejected_before_generation() {
    for os in [OsKind::Windows, OsKind::Unknown] {
        let mut ctx = BuildContext::default();
        let connection = mongo(&mut ctx, false);
        let mut host = host(&mut ctx, "Worker", os);

        assert!(matches!(
            connection.add_installer_db_args(&mut ctx, &mut host),
            Err(ConnectionError::UnsupportedHostOs { .. })
        ));
        assert!(matches!(
            connection.add_connection_db_args(&mut ctx, &mut host),
            Err(ConnectionError::UnsupportedHostOs { .. })
        ));
        assert!(host.user_data().is_empty());
        assert_eq!(script_assets(&ctx), 0);
        assert!(ctx.graph().grants().is_empty());
    }
}

#[test]
fn test_installer_args_use_client_certificate() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, false);
    let mut host = host(&mut ctx, "Worker", OsKind::Linux);
    connection.add_installer_db_args(&mut ctx, &mut host).unwrap();

    let script = host.user_data().render();
    for entry in [
        r#"["--dbssl"]=true"#,
        r#"["--dbauth"]=true"#,
        r#"["--dbsslauth"]=true"#,
        r#"["--dbhost"]='mongo.renderfarm.local'"#,
        r#"["--dbport"]=27017"#,
        r#"["--dbclientcert"]='/opt/Thinkbox/certs/mongo_client.pfx'"#,
        r#"["--dbcertpass"]=$CERT_PASSWORD"#,
    ] {
        assert!(script.contains(entry), "missing {entry}");
    }
    assert!(script.contains(CERT_PASSPHRASE_ARN));
    assert!(script.contains("unset CERT_PASSWORD"));

    // The certificate is on disk before the function is defined
    let download = script
        .find(&format!("{CERT_ARN} /opt/Thinkbox/certs/mongo_client.pfx"))
        .unwrap();
    let function = script.find("configure_database_installation_args(){").unwrap();
    assert!(download < function);
}

#[test]
fn test_connection_args_export_certificate() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, false);
    let mut host = host(&mut ctx, "Rcs", OsKind::Linux);
    connection.add_connection_db_args(&mut ctx, &mut host).unwrap();

    let script = host.user_data().render();
    assert!(script.contains("export DB_CERT_FILE='/opt/Thinkbox/certs/mongo_client.pfx'"));
    assert!(script.contains("export DB_CERT_PASSWORD=$("));
    assert!(script.contains("export -f configure_deadline_database"));
}

#[test]
fn test_same_os_hosts_share_one_download_asset() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, false);
    let mut first = host(&mut ctx, "First", OsKind::Linux);
    let mut second = host(&mut ctx, "Second", OsKind::Linux);

    connection.add_installer_db_args(&mut ctx, &mut first).unwrap();
    connection.add_connection_db_args(&mut ctx, &mut first).unwrap();
    connection.add_installer_db_args(&mut ctx, &mut second).unwrap();

    assert_eq!(script_assets(&ctx), 1);

    // Each host can read the staged script
    for principal in [&first.principal, &second.principal] {
        assert!(ctx.graph().grants().iter().any(|grant| &grant.principal == principal
            && matches!(grant.target, GrantTarget::Object { .. })));
    }
}

#[test]
fn test_grant_read_two_secrets() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, false);
    let role = Principal::new("ServiceRole");
    connection.grant_read(&mut ctx, &role);

    let mut secrets = ctx.graph().readable_secrets(&role);
    secrets.sort_unstable();
    assert_eq!(secrets, vec![CERT_ARN, CERT_PASSPHRASE_ARN]);
}

#[test]
fn test_dependency_on_server_autoscaling_group() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, false);
    let first = ctx.graph_mut().add_root("First", ResourceKind::Workload).unwrap();
    let second = ctx.graph_mut().add_root("Second", ResourceKind::Workload).unwrap();

    connection.add_child_dependency(&mut ctx, first).unwrap();
    connection.add_child_dependency(&mut ctx, second).unwrap();

    let edges: Vec<_> = ctx.graph().dependency_edges().copied().collect();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].dependency, edges[1].dependency);
    assert_eq!(ctx.graph().path(edges[0].dependency), "Mongo/Server/Resource");
}

#[test]
fn test_imported_instance_dependency_is_noop() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, true);
    let consumer = ctx.graph_mut().add_root("Consumer", ResourceKind::Workload).unwrap();

    connection.add_child_dependency(&mut ctx, consumer).unwrap();
    assert_eq!(ctx.graph().dependency_edges().count(), 0);
    assert_eq!(connection.database_construct(), None);
}

#[test]
fn test_security_groups_on_imported_instance_warn() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, true);
    connection
        .add_security_group(&mut ctx, &[SecurityGroupRef::new("GroupA", "sg-a")])
        .unwrap();

    let warnings: Vec<_> = ctx.diagnostics().warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("GroupA"));
}

#[test]
fn test_synthesis_contains_everything() {
    let mut ctx = BuildContext::default();
    let connection = mongo(&mut ctx, false);
    let mut rcs = host(&mut ctx, "Rcs", OsKind::Linux);
    connection.allow_connections_from(&mut ctx, rcs.resource).unwrap();
    connection.add_connection_db_args(&mut ctx, &mut rcs).unwrap();
    connection.grant_read(&mut ctx, &rcs.principal);
    connection.add_child_dependency(&mut ctx, rcs.resource).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&ctx.synthesize().to_json().unwrap()).unwrap();
    assert_eq!(json["ingressRules"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["dependencies"].as_array().map(Vec::len), Some(1));
    assert!(json["grants"].as_array().is_some_and(|grants| grants.len() >= 3));
    assert!(json["annotations"].as_array().is_some_and(Vec::is_empty));
}
