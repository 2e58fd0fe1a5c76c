//! # Secure Script Generation
//!
//! Builds exported bash functions that fetch secrets without leaking them
//! into execution traces.
//!
//! Boot-time traces (`set -x`) usually end up in logs that operators can
//! read, so every function generated here follows the same shape:
//!
//! 1. Define `getJsonVal`, which prints one field of a JSON object on stdin
//! 2. Remember whether tracing was on (`SET_X_IS_SET=$-`), then switch it off
//! 3. Fetch the secret (region scoped) and extract the needed fields
//! 4. Unset the raw secret blob as soon as fields are extracted
//! 5. Use the fields
//! 6. Unset the fields
//! 7. Restore tracing to its previous state
//! 8. `export -f` the function so later boot steps can call it
//!
//! Only ARNs and variable references appear in the text; secret values never
//! exist outside the host.

use crate::config::Settings;
use crate::graph::SecretRef;
use crate::observability::metrics;

/// Quote `value` for bash as a single-quoted word
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// `NAME=( ["flag"]=value ... )` for a bash associative array
///
/// Values are inserted verbatim; pass variable references (`$VAR`) or
/// values already quoted with [`shell_quote`].
#[must_use]
pub fn associative_array_assignment(name: &str, entries: &[(&str, String)]) -> String {
    let body = entries
        .iter()
        .map(|(key, value)| format!("[\"{key}\"]={value}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{name}=( {body} )")
}

/// Builder for one secret-safe exported function
#[derive(Debug)]
pub struct SecureFunction<'a> {
    name: &'static str,
    settings: &'a Settings,
    body: Vec<String>,
}

impl<'a> SecureFunction<'a> {
    #[must_use]
    pub fn new(name: &'static str, settings: &'a Settings) -> Self {
        Self {
            name,
            settings,
            body: Vec::new(),
        }
    }

    /// Fetch the `SecretString` of `secret` into `var`
    #[must_use]
    pub fn fetch_secret_string(mut self, var: &str, secret: &SecretRef, export: bool) -> Self {
        let export = if export { "export " } else { "" };
        self.body.push(format!(
            "{export}{var}=$({aws} secretsmanager get-secret-value --secret-id {arn} --region {region} | getJsonVal 'SecretString')",
            aws = self.settings.aws_cli,
            arn = shell_quote(&secret.arn),
            region = secret.region,
        ));
        self
    }

    /// Extract `field` of the JSON held in `source_var` into `var`
    #[must_use]
    pub fn extract_field(mut self, var: &str, source_var: &str, field: &str) -> Self {
        self.body.push(format!(
            "{var}=$(printenv {source_var} | getJsonVal {})",
            shell_quote(field)
        ));
        self
    }

    #[must_use]
    pub fn unset(mut self, vars: &[&str]) -> Self {
        if !vars.is_empty() {
            self.body.push(format!("unset {}", vars.join(" ")));
        }
        self
    }

    #[must_use]
    pub fn command(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    /// Wrap the body in the trace-suppressing preamble and export the function
    #[must_use]
    pub fn build(self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.body.len() + 8);
        lines.push(format!("{}(){{", self.name));
        lines.push(format!(
            "getJsonVal(){{ {} -c 'import json,sys;obj=json.load(sys.stdin);print(obj[\"'$1'\"])'; }}",
            self.settings.json_interpreter
        ));
        lines.push("SET_X_IS_SET=$-".to_string());
        lines.push("{ set +x; } 2>/dev/null".to_string());
        lines.extend(self.body);
        lines.push("if [[ $SET_X_IS_SET =~ x ]]; then set -x; else set +x; fi".to_string());
        lines.push("}".to_string());
        lines.push(format!("export -f {}", self.name));

        metrics::increment_scripts_generated(self.name);
        lines
    }
}
