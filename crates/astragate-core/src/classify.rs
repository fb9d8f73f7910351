use serde::Serialize;

pub const DEFAULT_SENSITIVE_KEYWORDS: &[&str] = &[
    "delete", "remove", "clear", "send", "message", "whatsapp", "email", "emergency",
];

pub const DEFAULT_ADMIN_KEYWORDS: &[&str] = &["emergency", "system", "admin", "configure"];

/// How an operation name falls against the keyword sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub sensitive: bool,
    pub admin_only: bool,
}

/// Case-insensitive substring match against any keyword.
pub fn contains_keyword<S: AsRef<str>>(operation: &str, keywords: &[S]) -> bool {
    let op = operation.to_lowercase();
    keywords.iter().any(|k| {
        let k = k.as_ref().trim().to_lowercase();
        !k.is_empty() && op.contains(&k)
    })
}

pub fn classify<S: AsRef<str>>(operation: &str, sensitive: &[S], admin: &[S]) -> Classification {
    Classification {
        sensitive: contains_keyword(operation, sensitive),
        admin_only: contains_keyword(operation, admin),
    }
}
