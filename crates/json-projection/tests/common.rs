#![allow(missing_docs, dead_code)]

pub const WEBHOOK: &str = r#"
{
    "action": "opened",
    "issue": {
        "number": 1347,
        "title": "Found a bug",
        "user": {
            "login": "octocat",
            "id": 1,
            "type": "User"
        },
        "labels": [
            {"id": 208045946, "name": "bug", "default": true},
            {"id": 208045947, "name": "help wanted", "default": false}
        ],
        "body": "I'm having a problem with this.\nIt crashes on \"é\" 🚀",
        "reactions": {"total_count": 0, "+1": 0, "-1": 0}
    },
    "repository": {
        "id": 1296269,
        "full_name": "octocat/Hello-World",
        "topics": ["octocat", "atom", "electron", "api"],
        "stargazers_count": 80,
        "score": 0.5e1
    },
    "sender": {"login": "octocat", "id": 1, "site_admin": false}
}
"#;
