//! Common fixtures for the integration tests

#![allow(dead_code, reason = "each test binary uses a different subset")]

use render_db_connection::prelude::*;

pub const LOGIN_ARN: &str =
    "arn:aws:secretsmanager:us-west-2:123456789012:secret:docdb-login-AbCdEf";
pub const CERT_ARN: &str =
    "arn:aws:secretsmanager:us-west-2:123456789012:secret:mongo-cert-AbCdEf";
pub const CERT_PASSPHRASE_ARN: &str =
    "arn:aws:secretsmanager:us-west-2:123456789012:secret:mongo-pass-AbCdEf";

pub fn docdb_props(engine_version: Option<&str>) -> DocDbClusterProps {
    DocDbClusterProps {
        endpoint: Endpoint::new("docdb.cluster.local", 27017),
        engine_version: engine_version.map(str::to_string),
        instances: 2,
        instance_class: "db.r5.large".to_string(),
    }
}

pub fn provisioned_docdb(ctx: &mut BuildContext, engine_version: Option<&str>) -> DatabaseConnection {
    let database =
        DocDbClusterRef::provision(ctx.graph_mut(), None, "Database", &docdb_props(engine_version))
            .unwrap();
    DatabaseConnection::new(
        ctx,
        ConnectionOptions::DocDb(DocDbConnectionOptions {
            database,
            login: SecretRef::from_arn(LOGIN_ARN).unwrap(),
        }),
    )
}

pub fn imported_docdb(ctx: &mut BuildContext) -> DatabaseConnection {
    let database = DocDbClusterRef::import(
        ctx.graph_mut(),
        None,
        "Database",
        Endpoint::new("docdb.cluster.local", 27017),
    )
    .unwrap();
    DatabaseConnection::new(
        ctx,
        ConnectionOptions::DocDb(DocDbConnectionOptions {
            database,
            login: SecretRef::from_arn(LOGIN_ARN).unwrap(),
        }),
    )
}

pub fn client_certificate() -> CertificateRef {
    CertificateRef {
        cert: SecretRef::from_arn(CERT_ARN).unwrap(),
        passphrase: SecretRef::from_arn(CERT_PASSPHRASE_ARN).unwrap(),
    }
}

pub fn mongo(ctx: &mut BuildContext, imported: bool) -> DatabaseConnection {
    let endpoint = Endpoint::new("mongo.renderfarm.local", 27017);
    let database = if imported {
        MongoDbInstanceRef::import(ctx.graph_mut(), None, "Mongo", endpoint)
    } else {
        MongoDbInstanceRef::provision(ctx.graph_mut(), None, "Mongo", endpoint)
    }
    .unwrap();
    DatabaseConnection::new(
        ctx,
        ConnectionOptions::MongoDbInstance(MongoDbInstanceConnectionOptions {
            database,
            client_certificate: client_certificate(),
        }),
    )
}

pub fn host(ctx: &mut BuildContext, name: &str, os: OsKind) -> Host {
    let resource = ctx
        .graph_mut()
        .add_root(name, ResourceKind::Workload)
        .unwrap();
    Host::new(resource, os, Principal::new(format!("{name}Role")))
}
