use axum::Json;

use crate::{ROUTES, RouteMeta};

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api",
    desc: "List every endpoint this service exposes.",
    category: "meta",
};

pub async fn routes() -> Json<&'static [RouteMeta]> {
    Json(ROUTES)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::ROUTES;

    #[test]
    fn routes_are_unique() {
        let mut seen = HashSet::new();
        for route in ROUTES {
            assert!(
                seen.insert((route.method, route.path)),
                "duplicate route {} {}",
                route.method,
                route.path
            );
            assert!(route.path.starts_with("/api"));
            assert!(!route.desc.is_empty());
        }
    }
}
