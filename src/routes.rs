/// Pages reachable from the navbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    BarCharts,
    Treemaps,
    PieChart,
    Surface3d,
    Map,
    Logout,
}

impl Route {
    /// Navbar order
    pub const NAV: [Route; 7] = [
        Route::Home,
        Route::BarCharts,
        Route::Treemaps,
        Route::PieChart,
        Route::Surface3d,
        Route::Map,
        Route::Logout,
    ];

    /// Unknown paths land on the home page
    pub fn parse(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "" | "/home" => Route::Home,
            "/bar-charts" => Route::BarCharts,
            "/treemaps" => Route::Treemaps,
            "/pie-chart" => Route::PieChart,
            "/3d-surface" => Route::Surface3d,
            "/rr-map" | "/map" => Route::Map,
            "/logout" => Route::Logout,
            _ => Route::Home,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/home",
            Route::BarCharts => "/bar-charts",
            Route::Treemaps => "/treemaps",
            Route::PieChart => "/pie-chart",
            Route::Surface3d => "/3d-surface",
            Route::Map => "/rr-map",
            Route::Logout => "/logout",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::BarCharts => "Bar Charts",
            Route::Treemaps => "Treemaps",
            Route::PieChart => "Pie Chart",
            Route::Surface3d => "3D Surface",
            Route::Map => "Map",
            Route::Logout => "Logout",
        }
    }

    /// File stem used for exports from this page
    pub fn slug(self) -> &'static str {
        self.path().trim_start_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/map"), Route::Map);
        assert_eq!(Route::parse("/rr-map"), Route::Map);
        assert_eq!(Route::parse("/3d-surface"), Route::Surface3d);
        assert_eq!(Route::parse("/nowhere"), Route::Home);
    }

    #[test]
    fn test_path_roundtrip() {
        for route in Route::NAV {
            assert_eq!(Route::parse(route.path()), route);
        }
        assert_eq!(Route::Map.slug(), "rr-map");
    }
}
