use serde_json::{json, Value};

/// IAM actions the handler calls against the calendar document.
pub const CALENDAR_DOCUMENT_ACTIONS: [&str; 3] = [
    "ssm:CreateDocument",
    "ssm:UpdateDocument",
    "ssm:DeleteDocument",
];

pub fn calendar_arn(partition: &str, region: &str, account: &str, calendar_name: &str) -> String {
    format!("arn:{partition}:ssm:{region}:{account}:document/{calendar_name}")
}

/// IAM policy statement granting the handler's document calls on one calendar.
pub fn calendar_policy_statement(calendar_arn: &str) -> Value {
    json!({
        "Effect": "Allow",
        "Action": CALENDAR_DOCUMENT_ACTIONS,
        "Resource": [calendar_arn],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_document_arn() {
        assert_eq!(
            calendar_arn("aws", "eu-west-1", "123456789012", "biz-hours"),
            "arn:aws:ssm:eu-west-1:123456789012:document/biz-hours"
        );
    }

    #[test]
    fn policy_statement_scopes_actions_to_calendar() {
        let arn = calendar_arn("aws-cn", "cn-north-1", "123456789012", "freeze");
        let statement = calendar_policy_statement(&arn);

        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Resource"], json!([arn]));
        assert_eq!(
            statement["Action"],
            json!([
                "ssm:CreateDocument",
                "ssm:UpdateDocument",
                "ssm:DeleteDocument"
            ])
        );
    }
}
