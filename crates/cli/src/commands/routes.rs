//! Route table inspection.

use ethical_kb_gateway::route_table::{RouteClass, RouteTable, is_static_asset};

/// How the edge policy treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Treatment {
    /// Skipped by the middleware.
    StaticAsset,
    /// Classified by the route table.
    Class(RouteClass),
}

/// Treatment of a single path under the default table.
#[must_use]
pub fn treatment(table: &RouteTable, path: &str) -> Treatment {
    if is_static_asset(path) {
        Treatment::StaticAsset
    } else {
        Treatment::Class(table.classify(path))
    }
}

/// Print the treatment of each path.
pub fn classify(paths: &[String]) {
    let table = RouteTable::default();
    for path in paths {
        match treatment(&table, path) {
            Treatment::StaticAsset => tracing::info!("{path}: static asset (no middleware)"),
            Treatment::Class(class) => tracing::info!("{path}: {class}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treatment() {
        let table = RouteTable::default();
        assert_eq!(treatment(&table, "/admin/users"), Treatment::Class(RouteClass::Protected));
        assert_eq!(treatment(&table, "/api/auth/session"), Treatment::Class(RouteClass::Api));
        assert_eq!(treatment(&table, "/login"), Treatment::Class(RouteClass::Auth));
        assert_eq!(treatment(&table, "/about"), Treatment::Class(RouteClass::Public));
        assert_eq!(treatment(&table, "/favicon.ico"), Treatment::StaticAsset);
    }
}
