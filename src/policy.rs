//! Route policy for every catalog endpoint.

use catalog_authz::{PolicyTable, Requirement, Role};

const EDITORS: &[Role] = &[Role::Editor, Role::Admin];
const ADMINS: &[Role] = &[Role::Admin];

const ENTITIES: [(&str, &str); 3] = [
    ("/api/authors", "/api/authors/{id}"),
    ("/api/categories", "/api/categories/{id}"),
    ("/api/books", "/api/books/{id}"),
];

/// Reads are open, creates need Editor or Admin, replace and delete need
/// Admin. Anything else under `/api` requires a token.
pub fn catalog_policy() -> PolicyTable {
    let mut table = PolicyTable::new("/api")
        .rule("POST", "/api/auth/register", Requirement::Anonymous)
        .rule("POST", "/api/auth/login", Requirement::Anonymous)
        .rule("POST", "/api/auth/refresh", Requirement::Anonymous)
        .rule("GET", "/api/auth/me", Requirement::Authenticated);

    for (collection, item) in ENTITIES {
        table = table
            .rule("GET", collection, Requirement::Anonymous)
            .rule("GET", item, Requirement::Anonymous)
            .rule("POST", collection, Requirement::AnyRole(EDITORS))
            .rule("PUT", item, Requirement::AnyRole(ADMINS))
            .rule("DELETE", item, Requirement::AnyRole(ADMINS));
    }

    table
}
