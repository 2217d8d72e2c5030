//! Link generation and matching through public routes.

use axum::http::{HeaderMap, HeaderValue, Uri};

use odata_routing::routing::{
    HttpRoute, ODataRoute, RequestContext, Route, RouteTable, RouteValues, HTTP_ROUTE_KEY, ODATA_PATH,
};

const SPECIAL_PATH: &str = "Customers('$&+,/:;=?@ <>#%{}|\\^~[]` ')";

fn request() -> RequestContext {
    RequestContext::new(Uri::from_static("http://localhost/vpath/prefix/Customers"), "/vpath")
}

fn link_values(odata_path: &str) -> RouteValues {
    let mut values = RouteValues::new();
    values.insert(ODATA_PATH, odata_path);
    values.insert(HTTP_ROUTE_KEY, true);
    values
}

#[test]
fn test_direct_links_possible_without_parameters() {
    assert!(ODataRoute::new(Some("prefix")).can_generate_direct_link());
    assert!(ODataRoute::new(Some("odata/v4")).can_generate_direct_link());
    assert!(ODataRoute::new(Some("")).can_generate_direct_link());
    assert!(ODataRoute::new(None).can_generate_direct_link());
    assert!(!ODataRoute::new(Some("{prefix}")).can_generate_direct_link());
    assert!(!ODataRoute::new(Some("{a}/b")).can_generate_direct_link());
}

#[test]
fn test_generate_link_directly() {
    let route = ODataRoute::new(Some("prefix"));
    assert_eq!(route.generate_link_directly("odataPath").virtual_path(), "prefix/odataPath");

    let route = ODataRoute::new(None);
    assert_eq!(route.generate_link_directly("odataPath").virtual_path(), "odataPath");
}

#[test]
fn test_relaxed_version_toggle() {
    let route = ODataRoute::new(Some("odata"));
    assert!(!route.version_constraint().unwrap().is_relaxed_match());

    let route = route.has_relaxed_odata_version_constraint();
    assert!(route.version_constraint().unwrap().is_relaxed_match());
}

#[test]
fn test_direct_link_matches_template_engine() {
    let odata_route = ODataRoute::new(Some("prefix"));
    let http_route = HttpRoute::new("prefix/{*odataPath}").unwrap();

    for path in ["", "odataPath", SPECIAL_PATH] {
        let values = link_values(path);
        let engine = http_route.virtual_path(&request(), &values).unwrap();
        let direct = odata_route.generate_link_directly(path);
        assert_eq!(direct, engine, "odataPath = {:?}", path);
        assert_eq!(odata_route.virtual_path(&request(), &values), Some(engine));
    }
}

#[test]
fn test_special_characters_encoding() {
    let link = ODataRoute::new(Some("prefix")).generate_link_directly(SPECIAL_PATH);
    assert_eq!(
        link.virtual_path(),
        "prefix/Customers('$&+,/:;=%3f@%20%3C%3E%23%25%7B%7D%7C%5C%5E~[]%60%20')"
    );
}

#[test]
fn test_escaped_braces_prefix_matches_template_engine() {
    let odata_route = ODataRoute::new(Some("{{odata}}"));
    let http_route = HttpRoute::new("{{odata}}/{*odataPath}").unwrap();
    assert!(odata_route.can_generate_direct_link());

    let values = link_values("People");
    let engine = http_route.virtual_path(&request(), &values).unwrap();
    assert_eq!(odata_route.virtual_path(&request(), &values), Some(engine.clone()));
    assert_eq!(engine.virtual_path(), "%7Bodata%7D/People");
}

#[test]
fn test_root_route_links() {
    let route = ODataRoute::new(None);
    let link = route.virtual_path(&request(), &link_values("Customers(1)")).unwrap();
    assert_eq!(link.virtual_path(), "Customers(1)");

    let link = route.virtual_path(&request(), &link_values("")).unwrap();
    assert_eq!(link.virtual_path(), "");
}

#[test]
fn test_generated_link_matches_back() {
    let mut table = RouteTable::new("/vpath");
    table.map_odata_route("odata", ODataRoute::new(Some("odata"))).unwrap();

    for path in ["Customers('A B')/Orders", "Tags('C#')", "People"] {
        let link = table
            .virtual_path("odata", &table.request(Uri::from_static("/")), &link_values(path))
            .unwrap()
            .unwrap();
        let uri: Uri = format!("http://localhost/vpath/{}", link).parse().unwrap();
        let found = table.match_request(&table.request(uri)).unwrap();
        assert_eq!(found.route, "odata");
        assert_eq!(found.values.get_str(ODATA_PATH), Some(path));
    }
}

#[test]
fn test_version_headers_gate_matching() {
    let mut table = RouteTable::new("/");
    table.map_odata_route("strict", ODataRoute::new(Some("v4"))).unwrap();
    table
        .map_odata_route("relaxed", ODataRoute::new(Some("legacy")).has_relaxed_odata_version_constraint())
        .unwrap();

    let with = |uri: &'static str, name: &'static str, value: &'static str| {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        table.request(Uri::from_static(uri)).with_headers(headers)
    };

    assert!(table.match_request(&with("/v4/People", "OData-Version", "4.0")).is_some());
    assert!(table.match_request(&with("/v4/People", "OData-Version", "3.0")).is_none());
    assert!(table.match_request(&with("/v4/People", "DataServiceVersion", "3.0")).is_none());
    assert!(table.match_request(&with("/v4/People", "OData-MaxVersion", "4.01")).is_some());
    assert!(table.match_request(&with("/legacy/People", "DataServiceVersion", "3.0")).is_some());
}
